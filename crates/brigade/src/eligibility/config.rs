use serde::{Deserialize, Serialize};

use crate::badges::{COMPULSORY, PROFICIENCY_AWARDS};

/// Rule set for the advancement badge check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub minimum_membership_years: i32,
    /// `"<name> <level>"`, or just the name for level-less awards.
    pub required_badges: Vec<String>,
    pub minimum_distinct_proficiency: usize,
    pub minimum_advanced_proficiency: usize,
    /// Subcategories that must each hold at least one badge.
    pub required_groups: Vec<String>,
    pub proficiency_category: String,
    pub excluded_sub_category: String,
    pub target_badge: String,
    /// Target once the member already holds `target_badge`.
    pub escalated_badge: String,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            minimum_membership_years: 3,
            required_badges: vec![
                "Target Badge Basic".to_string(),
                "Drill Advanced".to_string(),
                "Recruitment Basic".to_string(),
                "Christian Education Advanced".to_string(),
                "NCO Proficiency Star".to_string(),
            ],
            minimum_distinct_proficiency: 6,
            minimum_advanced_proficiency: 4,
            required_groups: ["groupA", "groupB", "groupC", "groupD"]
                .into_iter()
                .map(String::from)
                .collect(),
            proficiency_category: PROFICIENCY_AWARDS.to_string(),
            excluded_sub_category: COMPULSORY.to_string(),
            target_badge: "President's Badge".to_string(),
            escalated_badge: "Founder's Badge".to_string(),
        }
    }
}

impl EligibilityConfig {
    /// Number of criteria a report carries under this rule set.
    pub fn criteria_count(&self) -> usize {
        1 + self.required_badges.len() + 2 + self.required_groups.len()
    }
}

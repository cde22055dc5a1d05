//! Advancement badge eligibility.
//!
//! The engine is pure: held badges, the joining year and an evaluation date go in and an
//! [`EligibilityReport`] comes out. Nothing is persisted and evaluation never fails.
//!
//! Steps, in order:
//! 1. collapse duplicate names, keeping the Advanced record;
//! 2. check the required badges against the full, un-collapsed list;
//! 3. check membership duration in whole calendar years;
//! 4. tally elective proficiency badges per group;
//! 5. build the fixed-order checklist and progress;
//! 6. pick the target tier.

mod config;
mod policy;
mod rules;

#[cfg(test)]
mod tests;

pub use config::EligibilityConfig;
pub use policy::{Criterion, CriterionCheck};
pub use rules::{dedupe_best_level, matches_requirement, membership_years};

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::badges::HeldBadge;
use policy::progress_percentage;
use rules::{holds_requirement, tally_proficiency};

/// Stateless evaluator applying an [`EligibilityConfig`].
#[derive(Debug, Clone, Default)]
pub struct EligibilityEngine {
    config: EligibilityConfig,
}

impl EligibilityEngine {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    pub fn evaluate(
        &self,
        badges: &[HeldBadge],
        year_joined: &str,
        today: NaiveDate,
    ) -> EligibilityReport {
        let config = &self.config;
        let deduped = dedupe_best_level(badges);

        let required: Vec<RequiredBadgeStatus> = config
            .required_badges
            .iter()
            .map(|requirement| RequiredBadgeStatus {
                requirement: requirement.clone(),
                held: holds_requirement(badges, requirement),
            })
            .collect();

        let membership_years = membership_years(year_joined, today);
        let meets_duration =
            membership_years.is_some_and(|years| years >= config.minimum_membership_years);

        let tally = tally_proficiency(&deduped, config);
        let total_distinct_proficiency = tally.total_distinct();
        let total_advanced = tally.advanced.len();
        let groups: BTreeMap<String, bool> = config
            .required_groups
            .iter()
            .map(|group| (group.clone(), tally.has_group(group)))
            .collect();

        let mut criteria = Vec::with_capacity(config.criteria_count());
        criteria.push(CriterionCheck::new(
            Criterion::MembershipDuration {
                years: config.minimum_membership_years,
            },
            meets_duration,
        ));
        criteria.extend(required.iter().map(|status| {
            CriterionCheck::new(
                Criterion::RequiredBadge {
                    requirement: status.requirement.clone(),
                },
                status.held,
            )
        }));
        criteria.push(CriterionCheck::new(
            Criterion::DistinctProficiency {
                minimum: config.minimum_distinct_proficiency,
            },
            total_distinct_proficiency >= config.minimum_distinct_proficiency,
        ));
        criteria.push(CriterionCheck::new(
            Criterion::AdvancedProficiency {
                minimum: config.minimum_advanced_proficiency,
            },
            total_advanced >= config.minimum_advanced_proficiency,
        ));
        criteria.extend(config.required_groups.iter().map(|group| {
            CriterionCheck::new(
                Criterion::GroupRepresented {
                    group: group.clone(),
                },
                groups.get(group).copied().unwrap_or(false),
            )
        }));

        let progress = progress_percentage(&criteria);
        let eligible = criteria.iter().all(|check| check.fulfilled);

        let holds_target = badges
            .iter()
            .any(|badge| badge.trimmed_name().eq_ignore_ascii_case(&config.target_badge));
        let target = if holds_target {
            config.escalated_badge.clone()
        } else {
            config.target_badge.clone()
        };

        EligibilityReport {
            target,
            eligible,
            progress_percentage: progress,
            membership_years,
            meets_duration,
            total_distinct_proficiency,
            total_advanced,
            groups,
            required,
            criteria,
        }
    }
}

/// Held/not-held status of one required badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredBadgeStatus {
    pub requirement: String,
    pub held: bool,
}

/// Evaluation output; computed on demand and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReport {
    pub target: String,
    pub eligible: bool,
    pub progress_percentage: f64,
    pub membership_years: Option<i32>,
    pub meets_duration: bool,
    pub total_distinct_proficiency: usize,
    pub total_advanced: usize,
    pub groups: BTreeMap<String, bool>,
    pub required: Vec<RequiredBadgeStatus>,
    pub criteria: Vec<CriterionCheck>,
}

impl EligibilityReport {
    pub fn fulfilled(&self) -> Vec<&Criterion> {
        self.criteria
            .iter()
            .filter(|check| check.fulfilled)
            .map(|check| &check.criterion)
            .collect()
    }

    pub fn unfulfilled(&self) -> Vec<&Criterion> {
        self.criteria
            .iter()
            .filter(|check| !check.fulfilled)
            .map(|check| &check.criterion)
            .collect()
    }

    /// Messages for every unmet criterion, in checklist order.
    pub fn missing_messages(&self) -> Vec<String> {
        self.unfulfilled()
            .into_iter()
            .map(Criterion::summary)
            .collect()
    }
}

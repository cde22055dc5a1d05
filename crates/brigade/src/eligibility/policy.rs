use std::fmt;

use serde::{Deserialize, Serialize};

/// One line of the advancement checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Criterion {
    MembershipDuration { years: i32 },
    RequiredBadge { requirement: String },
    DistinctProficiency { minimum: usize },
    AdvancedProficiency { minimum: usize },
    GroupRepresented { group: String },
}

impl Criterion {
    /// Message shown while the criterion is unmet.
    pub fn summary(&self) -> String {
        match self {
            Criterion::MembershipDuration { years } => {
                format!("You need at least {years} years of membership.")
            }
            Criterion::RequiredBadge { requirement } => {
                format!("Missing required badge: {requirement}")
            }
            Criterion::DistinctProficiency { minimum } => {
                format!("You need at least {minimum} unique proficiency badges.")
            }
            Criterion::AdvancedProficiency { minimum } => {
                format!("You need at least {minimum} advanced proficiency badges.")
            }
            Criterion::GroupRepresented { group } => {
                format!("You need at least one badge from {}", group_label(group))
            }
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::MembershipDuration { years } => write!(f, "{years} years of membership"),
            Criterion::RequiredBadge { requirement } => f.write_str(requirement),
            Criterion::DistinctProficiency { minimum } => {
                write!(f, "{minimum} unique proficiency badges")
            }
            Criterion::AdvancedProficiency { minimum } => {
                write!(f, "{minimum} advanced proficiency badges")
            }
            Criterion::GroupRepresented { group } => write!(f, "a badge from {}", group_label(group)),
        }
    }
}

/// `groupA` reads as `Group A`; anything else is shown as stored.
fn group_label(group: &str) -> String {
    match group.strip_prefix("group") {
        Some(suffix) if !suffix.is_empty() => format!("Group {suffix}"),
        _ => group.to_string(),
    }
}

/// Evaluated criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionCheck {
    pub criterion: Criterion,
    pub fulfilled: bool,
}

impl CriterionCheck {
    pub fn new(criterion: Criterion, fulfilled: bool) -> Self {
        Self {
            criterion,
            fulfilled,
        }
    }
}

/// `fulfilled / total * 100`; an empty checklist counts as complete.
pub(crate) fn progress_percentage(checks: &[CriterionCheck]) -> f64 {
    if checks.is_empty() {
        return 100.0;
    }
    let fulfilled = checks.iter().filter(|check| check.fulfilled).count();
    fulfilled as f64 / checks.len() as f64 * 100.0
}

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use super::config::EligibilityConfig;
use crate::badges::{BadgeLevel, HeldBadge};

/// Collapse records sharing a trimmed name, keeping Advanced over anything else.
///
/// First-seen order is preserved; applying it twice changes nothing.
pub fn dedupe_best_level(badges: &[HeldBadge]) -> Vec<HeldBadge> {
    let mut kept: Vec<HeldBadge> = Vec::with_capacity(badges.len());
    let mut index_by_name: BTreeMap<&str, usize> = BTreeMap::new();

    for badge in badges {
        match index_by_name.get(badge.trimmed_name()) {
            Some(&index) => {
                if badge.is_advanced() && !kept[index].is_advanced() {
                    kept[index] = badge.clone();
                }
            }
            None => {
                index_by_name.insert(badge.trimmed_name(), kept.len());
                kept.push(badge.clone());
            }
        }
    }

    kept
}

/// Whether `badge` satisfies a requirement string such as `Drill Advanced`.
pub fn matches_requirement(badge: &HeldBadge, requirement: &str) -> bool {
    let level = badge.level.map(BadgeLevel::label).unwrap_or("");
    let labelled = format!("{} {}", badge.trimmed_name(), level);
    if labelled.eq_ignore_ascii_case(requirement) {
        return true;
    }
    badge.level.is_none() && badge.trimmed_name().eq_ignore_ascii_case(requirement)
}

pub(crate) fn holds_requirement(badges: &[HeldBadge], requirement: &str) -> bool {
    badges
        .iter()
        .any(|badge| matches_requirement(badge, requirement))
}

/// Leading integer of a trimmed string, the way lenient year fields are read.
pub(crate) fn leading_int(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i32>().ok().map(|value| sign * value)
}

/// Whole calendar years between the joining year and `today`.
pub fn membership_years(year_joined: &str, today: NaiveDate) -> Option<i32> {
    leading_int(year_joined).map(|joined| today.year() - joined)
}

/// Distinct proficiency names grouped by subcategory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ProficiencyTally {
    pub groups: BTreeMap<String, BTreeSet<String>>,
    pub others: BTreeSet<String>,
    pub advanced: BTreeSet<String>,
}

impl ProficiencyTally {
    pub fn total_distinct(&self) -> usize {
        self.groups.values().map(BTreeSet::len).sum()
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.get(group).is_some_and(|names| !names.is_empty())
    }
}

/// Bucket de-duplicated elective proficiency badges.
pub(crate) fn tally_proficiency(deduped: &[HeldBadge], config: &EligibilityConfig) -> ProficiencyTally {
    let mut tally = ProficiencyTally::default();

    let electives = deduped.iter().filter(|badge| {
        badge.category() == config.proficiency_category
            && badge.sub_category() != config.excluded_sub_category
            && !config
                .required_badges
                .iter()
                .any(|requirement| matches_requirement(badge, requirement))
    });

    for badge in electives {
        let name = badge.trimmed_name().to_string();
        if badge.is_advanced() {
            tally.advanced.insert(name.clone());
        }
        if config
            .required_groups
            .iter()
            .any(|group| group == badge.sub_category())
        {
            tally
                .groups
                .entry(badge.sub_category().to_string())
                .or_default()
                .insert(name);
        } else {
            tally.others.insert(name);
        }
    }

    tally
}

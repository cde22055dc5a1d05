use chrono::NaiveDate;

use crate::badges::{
    BadgeDefinition, BadgeDescription, BadgeKey, BadgeLevel, CatalogEntry, HeldBadge, COMPULSORY,
    PROFICIENCY_AWARDS, SPECIAL_AWARDS,
};
use crate::eligibility::{EligibilityConfig, EligibilityEngine};

pub(super) fn engine() -> EligibilityEngine {
    EligibilityEngine::new(EligibilityConfig::default())
}

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 20).expect("valid date")
}

pub(super) fn badge(
    category: &str,
    sub_category: &str,
    name: &str,
    level: Option<BadgeLevel>,
) -> HeldBadge {
    let badge_key = name.trim().to_lowercase().replace(' ', "-");
    CatalogEntry {
        key: BadgeKey::new(category, sub_category, badge_key),
        definition: BadgeDefinition {
            name: name.to_string(),
            description: BadgeDescription::default(),
            points: None,
        },
    }
    .held(level)
}

pub(super) fn elective(group: &str, name: &str, level: BadgeLevel) -> HeldBadge {
    badge(PROFICIENCY_AWARDS, group, name, Some(level))
}

pub(super) fn special(name: &str) -> HeldBadge {
    badge(SPECIAL_AWARDS, "special", name, None)
}

/// The five compulsory badges at the levels the checklist asks for.
pub(super) fn required_set() -> Vec<HeldBadge> {
    vec![
        badge(PROFICIENCY_AWARDS, COMPULSORY, "Target Badge", Some(BadgeLevel::Basic)),
        badge(PROFICIENCY_AWARDS, COMPULSORY, "Drill", Some(BadgeLevel::Advanced)),
        badge(PROFICIENCY_AWARDS, COMPULSORY, "Recruitment", Some(BadgeLevel::Basic)),
        badge(
            PROFICIENCY_AWARDS,
            COMPULSORY,
            "Christian Education",
            Some(BadgeLevel::Advanced),
        ),
        badge(PROFICIENCY_AWARDS, COMPULSORY, "NCO Proficiency Star", None),
    ]
}

/// Six electives across all four groups, four of them Advanced.
pub(super) fn elective_set() -> Vec<HeldBadge> {
    vec![
        elective("groupA", "First Aid", BadgeLevel::Advanced),
        elective("groupA", "Safety", BadgeLevel::Basic),
        elective("groupB", "Swimming", BadgeLevel::Advanced),
        elective("groupC", "Arts & Crafts", BadgeLevel::Advanced),
        elective("groupC", "Music", BadgeLevel::Basic),
        elective("groupD", "Hiking", BadgeLevel::Advanced),
    ]
}

pub(super) fn full_record() -> Vec<HeldBadge> {
    let mut badges = required_set();
    badges.extend(elective_set());
    badges
}

use super::common::*;
use crate::badges::{BadgeLevel, COMPULSORY, PROFICIENCY_AWARDS};
use crate::eligibility::{Criterion, EligibilityConfig, EligibilityEngine};

#[test]
fn new_member_only_meets_duration() {
    let report = engine().evaluate(&[], "2023", today());

    assert!(report.meets_duration);
    assert_eq!(report.membership_years, Some(3));
    assert_eq!(report.criteria.len(), 11);
    assert_eq!(report.unfulfilled().len(), 10);
    assert_eq!(
        report.fulfilled(),
        vec![&Criterion::MembershipDuration { years: 3 }]
    );
    assert!(!report.eligible);
    assert!((report.progress_percentage - 100.0 / 11.0).abs() < 1e-9);
}

#[test]
fn compulsory_set_satisfies_all_required_criteria() {
    let report = engine().evaluate(&required_set(), "2020", today());

    assert!(report.required.iter().all(|status| status.held));
    let required_met = report
        .criteria
        .iter()
        .filter(|check| matches!(check.criterion, Criterion::RequiredBadge { .. }))
        .filter(|check| check.fulfilled)
        .count();
    assert_eq!(required_met, 5);
    assert_eq!(report.total_distinct_proficiency, 0);
}

#[test]
fn required_badge_matching_ignores_case_and_padding() {
    let badges = vec![
        badge(PROFICIENCY_AWARDS, COMPULSORY, "  drill ", Some(BadgeLevel::Advanced)),
        badge(PROFICIENCY_AWARDS, COMPULSORY, "nco proficiency star", None),
    ];

    let report = engine().evaluate(&badges, "2020", today());

    let held: Vec<_> = report
        .required
        .iter()
        .filter(|status| status.held)
        .map(|status| status.requirement.as_str())
        .collect();
    assert_eq!(held, vec!["Drill Advanced", "NCO Proficiency Star"]);
}

#[test]
fn wrong_level_does_not_satisfy_requirement() {
    let badges = vec![badge(
        PROFICIENCY_AWARDS,
        COMPULSORY,
        "Drill",
        Some(BadgeLevel::Basic),
    )];

    let report = engine().evaluate(&badges, "2020", today());

    assert!(!report.required[1].held);
    assert!(report
        .missing_messages()
        .contains(&"Missing required badge: Drill Advanced".to_string()));
}

#[test]
fn required_badge_counts_even_when_superseded_by_dedup() {
    let badges = vec![
        badge(PROFICIENCY_AWARDS, COMPULSORY, "Target Badge", Some(BadgeLevel::Basic)),
        badge(PROFICIENCY_AWARDS, COMPULSORY, "Target Badge", Some(BadgeLevel::Advanced)),
    ];

    let report = engine().evaluate(&badges, "2020", today());

    assert!(report.required[0].held);
}

#[test]
fn full_record_is_eligible() {
    let report = engine().evaluate(&full_record(), "2019", today());

    assert!(report.eligible, "missing: {:?}", report.missing_messages());
    assert_eq!(report.progress_percentage, 100.0);
    assert_eq!(report.total_distinct_proficiency, 6);
    assert_eq!(report.total_advanced, 4);
    assert!(report.groups.values().all(|present| *present));
    assert_eq!(report.target, "President's Badge");
}

#[test]
fn missing_group_is_reported_alone() {
    let mut badges = required_set();
    badges.extend(
        elective_set()
            .into_iter()
            .filter(|badge| badge.sub_category() != "groupD"),
    );
    badges.push(elective("groupC", "Computer", BadgeLevel::Advanced));

    let report = engine().evaluate(&badges, "2019", today());

    assert_eq!(
        report.missing_messages(),
        vec!["You need at least one badge from Group D".to_string()]
    );
    assert_eq!(report.groups.get("groupD"), Some(&false));
}

#[test]
fn unrecognised_subcategory_does_not_count_toward_totals() {
    let badges = vec![
        elective("groupA", "First Aid", BadgeLevel::Basic),
        elective("groupE", "Robotics", BadgeLevel::Advanced),
    ];

    let report = engine().evaluate(&badges, "2020", today());

    assert_eq!(report.total_distinct_proficiency, 1);
    assert_eq!(report.total_advanced, 1);
}

#[test]
fn compulsory_and_non_proficiency_badges_are_not_electives() {
    let badges = vec![
        badge(PROFICIENCY_AWARDS, COMPULSORY, "Drill", Some(BadgeLevel::Advanced)),
        badge(PROFICIENCY_AWARDS, "groupA", "Drill", Some(BadgeLevel::Advanced)),
        special("Leadership Award"),
    ];

    let report = engine().evaluate(&badges, "2020", today());

    assert_eq!(report.total_distinct_proficiency, 0);
    assert_eq!(report.total_advanced, 0);
}

#[test]
fn holding_presidents_badge_escalates_target_only() {
    let mut badges = full_record();
    let before = engine().evaluate(&badges, "2019", today());

    badges.push(special(" president's badge "));
    let after = engine().evaluate(&badges, "2019", today());

    assert_eq!(after.target, "Founder's Badge");
    assert_eq!(after.criteria, before.criteria);
    assert_eq!(after.progress_percentage, before.progress_percentage);
}

#[test]
fn unparseable_or_recent_joining_year_fails_duration() {
    for year_joined in ["", "abc", "2025", "  2024"] {
        let report = engine().evaluate(&[], year_joined, today());
        assert!(!report.meets_duration, "{year_joined:?} should fail");
    }

    let report = engine().evaluate(&[], " 2021 (transferred)", today());
    assert_eq!(report.membership_years, Some(5));
    assert!(report.meets_duration);
}

#[test]
fn custom_config_changes_thresholds_and_checklist_length() {
    let config = EligibilityConfig {
        minimum_distinct_proficiency: 2,
        minimum_advanced_proficiency: 1,
        required_badges: vec!["Drill Advanced".to_string()],
        required_groups: vec!["groupA".to_string(), "groupB".to_string()],
        ..EligibilityConfig::default()
    };
    let engine = EligibilityEngine::new(config);
    let badges = vec![
        badge(PROFICIENCY_AWARDS, COMPULSORY, "Drill", Some(BadgeLevel::Advanced)),
        elective("groupA", "First Aid", BadgeLevel::Advanced),
        elective("groupB", "Swimming", BadgeLevel::Basic),
    ];

    let report = engine.evaluate(&badges, "2020", today());

    assert_eq!(report.criteria.len(), 6);
    assert!(report.eligible, "missing: {:?}", report.missing_messages());
}

#[test]
fn unmet_messages_follow_checklist_order() {
    let report = engine().evaluate(&[], "2025", today());
    let messages = report.missing_messages();

    assert_eq!(messages.len(), 11);
    assert_eq!(messages[0], "You need at least 3 years of membership.");
    assert_eq!(messages[1], "Missing required badge: Target Badge Basic");
    assert_eq!(messages[6], "You need at least 6 unique proficiency badges.");
    assert_eq!(messages[7], "You need at least 4 advanced proficiency badges.");
    assert_eq!(messages[8], "You need at least one badge from Group A");
}

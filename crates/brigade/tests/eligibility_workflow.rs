//! Eligibility over member records loaded from a store snapshot, as the CLI does it.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use brigade::badges::SelectionConfig;
use brigade::eligibility::EligibilityConfig;
use brigade::service::{BrigadeService, ServiceSettings};
use brigade::store::MemoryStore;

fn badge(sub_category: &str, name: &str, level: Option<&str>) -> serde_json::Value {
    let mut badge = json!({
        "name": name,
        "description": "",
        "category": "proficiencyAwards",
        "subCategory": sub_category,
        "badgeKey": name.to_lowercase().replace(' ', "-"),
    });
    if let Some(level) = level {
        badge["level"] = json!(level);
    }
    badge
}

fn service(users: serde_json::Value) -> BrigadeService<MemoryStore> {
    BrigadeService::new(
        Arc::new(MemoryStore::from_value(json!({ "users": users }))),
        ServiceSettings {
            eligibility: EligibilityConfig::default(),
            selection: SelectionConfig::default(),
            season_year: 2026,
        },
    )
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 1).expect("valid date")
}

#[test]
fn stored_record_with_lenient_levels_is_eligible() {
    let service = service(json!({
        "u1": {
            "id": "u1",
            "name": "Jordan Lim",
            "dob": "2007-02-11",
            "rank": "Sergeant",
            "yearJoined": "2020",
            "badges": [
                badge("compulsory", "Target Badge", Some("basic")),
                badge("compulsory", "Drill", Some(" Advanced")),
                badge("compulsory", "Recruitment", Some("Basic")),
                badge("compulsory", "Christian Education", Some("Advanced")),
                badge("compulsory", "NCO Proficiency Star", None),
                badge("groupA", "First Aid", Some("Basic")),
                badge("groupA", "First Aid", Some("Advanced")),
                badge("groupA", "Safety", Some("Basic")),
                badge("groupB", "Swimming", Some("Advanced")),
                badge("groupC", "Music", Some("Advanced")),
                badge("groupC", "Arts", Some("Basic")),
                badge("groupD", "Hiking", Some("Advanced"))
            ]
        }
    }));

    let report = service.evaluate_member("u1", today()).expect("report");

    assert!(report.eligible, "missing: {:?}", report.missing_messages());
    assert_eq!(report.total_distinct_proficiency, 6);
    assert_eq!(report.total_advanced, 4);
    assert_eq!(report.progress_percentage, 100.0);
}

#[test]
fn partially_filled_profiles_are_listed() {
    let service = service(json!({
        "u1": { "id": "u1", "name": "Jordan Lim", "dob": "2007-02-11", "rank": "Sergeant", "yearJoined": "2020" },
        "u2": { "name": "No Dob", "rank": "Private", "squad": "4" },
        "u3": "not a member"
    }));

    let members = service.list_members().expect("list");

    let names: Vec<_> = members.iter().map(|member| member.name.as_str()).collect();
    assert_eq!(names, vec!["Jordan Lim", "No Dob"]);
    assert_eq!(members[1].id, "u2");
    assert_eq!(members[1].squad_name().as_deref(), Some("Squad 4"));
}

#[test]
fn partial_badge_records_degrade_to_missing_criteria() {
    let service = service(json!({
        "nco": {
            "name": "Sam Ong",
            "yearJoined": "2019",
            "badges": [
                { "name": "NCO Proficiency Star", "badgeKey": "nco", "category": "default", "description": "" },
                { "badgeKey": "nameless" },
                badge("groupA", "First Aid", Some("Advanced"))
            ]
        },
        "empty": { "name": "Lee Tan", "badges": null }
    }));

    let report = service.evaluate_member("nco", today()).expect("report");
    assert!(!report.eligible);
    assert!(report.meets_duration);
    assert!(report
        .required
        .iter()
        .any(|status| status.requirement == "NCO Proficiency Star" && status.held));
    assert_eq!(report.total_distinct_proficiency, 1);
    assert_eq!(report.total_advanced, 1);

    let report = service.evaluate_member("empty", today()).expect("report");
    assert!(!report.eligible);
    assert_eq!(report.membership_years, None);
    assert_eq!(report.progress_percentage, 0.0);
    assert_eq!(
        report.missing_messages().first().map(String::as_str),
        Some("You need at least 3 years of membership.")
    );
    assert_eq!(report.missing_messages().len(), 11);
}

#[test]
fn missing_member_has_no_report() {
    let service = service(json!({}));
    assert!(service.evaluate_member("nobody", today()).is_err());
}

use brigade::config::{AppConfig, RosterConfig};
use brigade::error::AppError;
use brigade::service::{BrigadeService, ServiceSettings};
use brigade::store::MemoryStore;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory store seeded from the configured snapshot, or empty.
pub(crate) fn load_store(roster: &RosterConfig) -> Result<MemoryStore, AppError> {
    match &roster.data_file {
        Some(path) => load_snapshot(path),
        None => Ok(MemoryStore::new()),
    }
}

pub(crate) fn load_snapshot(path: &Path) -> Result<MemoryStore, AppError> {
    let store = MemoryStore::from_path(path)?;
    info!(path = %path.display(), "roster snapshot loaded");
    Ok(store)
}

pub(crate) fn build_service(
    config: &AppConfig,
    store: MemoryStore,
) -> BrigadeService<MemoryStore> {
    BrigadeService::new(Arc::new(store), ServiceSettings::from_roster(&config.roster))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn held(category: &str, sub_category: &str, key: &str, name: &str, level: Option<&str>) -> Value {
    let mut badge = json!({
        "name": name,
        "description": "",
        "category": category,
        "subCategory": sub_category,
        "badgeKey": key,
    });
    if let Some(level) = level {
        badge["level"] = json!(level);
    }
    badge
}

fn proficiency(sub_category: &str, key: &str, name: &str, level: &str) -> Value {
    held("proficiencyAwards", sub_category, key, name, Some(level))
}

/// Small company used by the `demo` command.
pub(crate) fn demo_snapshot() -> Value {
    let levelled = |basic: &str, advanced: &str| json!({ "Basic": basic, "Advanced": advanced });
    json!({
        "badges": {
            "proficiencyAwards": {
                "compulsory": {
                    "target": { "name": "Target Badge", "description": levelled("Set a personal target", "Lead a squad target") },
                    "drill": { "name": "Drill", "description": levelled("Foot drill", "Take a squad on parade") },
                    "recruitment": { "name": "Recruitment", "description": levelled("Bring a friend", "Bring three friends") },
                    "christian-education": { "name": "Christian Education", "description": levelled("Bible knowledge", "Lead devotion") },
                    "nco-star": { "name": "NCO Proficiency Star", "description": "NCO course" }
                },
                "groupA": {
                    "first-aid": { "name": "First Aid", "description": levelled("Bandaging", "CPR") },
                    "safety": { "name": "Safety", "description": levelled("Home safety", "Fire safety") }
                },
                "groupB": {
                    "swimming": { "name": "Swimming", "description": levelled("25m", "100m") }
                },
                "groupC": {
                    "music": { "name": "Music", "description": levelled("Read notation", "Perform") },
                    "arts": { "name": "Arts & Crafts", "description": levelled("Sketching", "Portfolio") }
                },
                "groupD": {
                    "hiking": { "name": "Hiking", "description": levelled("Day hike", "Overnight expedition") }
                }
            },
            "serviceAwards": {
                "service": {
                    "one-year": { "name": "One Year Service", "description": "A full year of service" }
                }
            },
            "specialAwards": {
                "special": {
                    "presidents": { "name": "President's Badge", "description": "Highest award for seniors" }
                }
            }
        },
        "users": {
            "demo-jordan": {
                "id": "demo-jordan",
                "name": "Jordan Lim",
                "dob": "2008-11-02",
                "rank": "Sergeant",
                "role": "Drill Sergeant",
                "squad": 1,
                "platoon": "A",
                "yearJoined": "2020",
                "badges": [
                    proficiency("compulsory", "target", "Target Badge", "Basic"),
                    proficiency("compulsory", "drill", "Drill", "Advanced"),
                    proficiency("compulsory", "recruitment", "Recruitment", "Basic"),
                    proficiency("compulsory", "christian-education", "Christian Education", "Advanced"),
                    held("proficiencyAwards", "compulsory", "nco-star", "NCO Proficiency Star", None),
                    proficiency("groupA", "first-aid", "First Aid", "Advanced"),
                    proficiency("groupA", "safety", "Safety", "Basic"),
                    proficiency("groupB", "swimming", "Swimming", "Advanced"),
                    proficiency("groupC", "music", "Music", "Advanced"),
                    proficiency("groupC", "arts", "Arts & Crafts", "Basic"),
                    proficiency("groupD", "hiking", "Hiking", "Advanced")
                ]
            },
            "demo-priya": {
                "id": "demo-priya",
                "name": "Priya Nair",
                "dob": "2011-03-20",
                "rank": "Private",
                "squad": 2,
                "platoon": "A",
                "yearJoined": "2024",
                "badges": [
                    proficiency("compulsory", "drill", "Drill", "Basic"),
                    proficiency("groupA", "first-aid", "First Aid", "Basic"),
                    held("serviceAwards", "service", "one-year", "One Year Service", None)
                ]
            }
        },
        "attendance": {
            "2025-03-01_Squad 1_Jordan Lim": {
                "date": "2025-03-01", "memberId": "demo-jordan", "memberName": "Jordan Lim",
                "squadName": "Squad 1", "status": "present", "rank": "Sergeant"
            },
            "2025-03-01_Squad 2_Priya Nair": {
                "date": "2025-03-01", "memberId": "demo-priya", "memberName": "Priya Nair",
                "squadName": "Squad 2", "status": "excused", "rank": "Private"
            },
            "2025-03-08_Squad 1_Jordan Lim": {
                "date": "2025-03-08", "memberId": "demo-jordan", "memberName": "Jordan Lim",
                "squadName": "Squad 1", "status": "present", "rank": "Sergeant"
            }
        },
        "parades": {
            "March": {
                "p1": { "date": "2025-03-01T09:00" },
                "p2": { "date": "2025-03-08T09:00" },
                "p3": { "date": "2025-03-15T09:00" }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_snapshot_members_parse() {
        let store = MemoryStore::from_value(demo_snapshot());
        let service = BrigadeService::new(
            Arc::new(store),
            ServiceSettings::from_roster(&RosterConfig {
                data_file: None,
                season_year: 2025,
                backfill_basic: false,
            }),
        );

        let members = service.list_members().expect("members load");
        assert_eq!(members.len(), 2);

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
        let report = service
            .evaluate_member("demo-jordan", today)
            .expect("report");
        assert!(report.eligible, "missing: {:?}", report.missing_messages());
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("2025-03-01").is_ok());
        assert!(parse_date("01/03/2025").is_err());
    }
}

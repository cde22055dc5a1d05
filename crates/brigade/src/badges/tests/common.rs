use std::sync::Arc;

use serde_json::{json, Value};

use crate::badges::catalog::BadgeCatalog;
use crate::badges::domain::{BadgeKey, BadgeLevel, HeldBadge, SelectionKey, PROFICIENCY_AWARDS};
use crate::badges::selection::{BadgeSelection, SelectionConfig, SelectionEvent};

pub(super) fn catalog_tree() -> Value {
    json!({
        "proficiencyAwards": {
            "compulsory": {
                "drill": { "name": "Drill", "description": { "Basic": "Foot drill", "Advanced": "Lead drill" } },
                "target": { "name": "Target Badge", "description": { "Basic": "Set a target", "Advanced": "Meet it" } }
            },
            "groupA": {
                "first-aid": { "name": "First Aid", "description": { "Basic": "Bandaging", "Advanced": "CPR" } }
            },
            "groupB": {
                "swimming": { "name": "Swimming", "description": { "Basic": "25m", "Advanced": "100m" } }
            }
        },
        "serviceAwards": {
            "service": {
                "one-year": { "name": "One Year Service", "description": "A full year of service" },
                "long-service": { "name": "Long Service", "description": "Five years of service" }
            }
        },
        "specialAwards": {
            "special": {
                "presidents": { "name": "President's Badge", "description": "Highest award" }
            }
        }
    })
}

pub(super) fn catalog() -> Arc<BadgeCatalog> {
    Arc::new(BadgeCatalog::from_tree(&catalog_tree()))
}

pub(super) fn selection(config: SelectionConfig) -> BadgeSelection {
    BadgeSelection::new(catalog(), config)
}

pub(super) fn held(sub_category: &str, badge_key: &str, level: Option<BadgeLevel>) -> HeldBadge {
    catalog()
        .entry(PROFICIENCY_AWARDS, sub_category, badge_key)
        .expect("fixture badge exists")
        .held(level)
}

pub(super) fn key(category: &str, sub_category: &str, badge_key: &str, level: Option<BadgeLevel>) -> SelectionKey {
    SelectionKey {
        key: BadgeKey::new(category, sub_category, badge_key),
        level,
    }
}

/// Drive the picker down to one subcategory's badge list.
pub(super) fn open(selection: &mut BadgeSelection, category: &str, sub_category: &str) {
    selection
        .apply(SelectionEvent::SelectCategory(category.to_string()))
        .expect("category opens");
    selection
        .apply(SelectionEvent::SelectSubCategory(sub_category.to_string()))
        .expect("subcategory opens");
}

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

pub const PROFICIENCY_AWARDS: &str = "proficiencyAwards";
pub const SERVICE_AWARDS: &str = "serviceAwards";
pub const SPECIAL_AWARDS: &str = "specialAwards";

/// Subcategory holding the mandatory proficiency badges.
pub const COMPULSORY: &str = "compulsory";

/// Service award that is recorded once per year of service.
pub const ONE_YEAR_SERVICE: &str = "One Year Service";

/// The three award families in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BadgeCategory {
    #[serde(rename = "proficiencyAwards")]
    Proficiency,
    #[serde(rename = "serviceAwards")]
    Service,
    #[serde(rename = "specialAwards")]
    Special,
}

impl BadgeCategory {
    pub const ALL: [BadgeCategory; 3] = [Self::Proficiency, Self::Service, Self::Special];

    pub const fn key(self) -> &'static str {
        match self {
            BadgeCategory::Proficiency => PROFICIENCY_AWARDS,
            BadgeCategory::Service => SERVICE_AWARDS,
            BadgeCategory::Special => SPECIAL_AWARDS,
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            BadgeCategory::Proficiency => "Proficiency Awards",
            BadgeCategory::Service => "Service Awards",
            BadgeCategory::Special => "Special Awards",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }

    /// Only proficiency awards are earned at Basic and Advanced.
    pub const fn has_levels(self) -> bool {
        matches!(self, BadgeCategory::Proficiency)
    }
}

/// Achievement level of a proficiency award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BadgeLevel {
    Basic,
    Advanced,
}

impl BadgeLevel {
    pub const fn label(self) -> &'static str {
        match self {
            BadgeLevel::Basic => "Basic",
            BadgeLevel::Advanced => "Advanced",
        }
    }

    /// Case-insensitive parse that tolerates surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("basic") {
            Some(BadgeLevel::Basic)
        } else if trimmed.eq_ignore_ascii_case("advanced") {
            Some(BadgeLevel::Advanced)
        } else {
            None
        }
    }
}

impl fmt::Display for BadgeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Badge description, either shared or per level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BadgeDescription {
    Plain(String),
    Levelled {
        #[serde(rename = "Basic", default, skip_serializing_if = "Option::is_none")]
        basic: Option<String>,
        #[serde(rename = "Advanced", default, skip_serializing_if = "Option::is_none")]
        advanced: Option<String>,
    },
}

impl Default for BadgeDescription {
    fn default() -> Self {
        BadgeDescription::Plain(String::new())
    }
}

impl BadgeDescription {
    pub fn for_level(&self, level: Option<BadgeLevel>) -> Option<&str> {
        match (self, level) {
            (BadgeDescription::Plain(text), _) => Some(text.as_str()),
            (BadgeDescription::Levelled { basic, .. }, Some(BadgeLevel::Basic)) => basic.as_deref(),
            (BadgeDescription::Levelled { advanced, .. }, Some(BadgeLevel::Advanced)) => {
                advanced.as_deref()
            }
            (BadgeDescription::Levelled { basic, advanced }, None) => {
                basic.as_deref().or(advanced.as_deref())
            }
        }
    }
}

/// Points awarded per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgePoints {
    #[serde(rename = "Basic", default, skip_serializing_if = "Option::is_none")]
    pub basic: Option<u32>,
    #[serde(rename = "Advanced", default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<u32>,
}

/// Catalog entry as stored at `badges/{category}/{subCategory}/{badgeKey}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub name: String,
    #[serde(default)]
    pub description: BadgeDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<BadgePoints>,
}

/// Location of a definition inside the catalog tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeKey {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default)]
    pub badge_key: String,
}

impl BadgeKey {
    pub fn new(
        category: impl Into<String>,
        sub_category: impl Into<String>,
        badge_key: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            sub_category: sub_category.into(),
            badge_key: badge_key.into(),
        }
    }

    pub fn category_kind(&self) -> Option<BadgeCategory> {
        BadgeCategory::from_key(&self.category)
    }

    pub fn is_proficiency(&self) -> bool {
        self.category == PROFICIENCY_AWARDS
    }
}

/// A definition together with where it lives in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub key: BadgeKey,
    #[serde(flatten)]
    pub definition: BadgeDefinition,
}

impl CatalogEntry {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn held(self, level: Option<BadgeLevel>) -> HeldBadge {
        HeldBadge { entry: self, level }
    }
}

/// A badge on a member's record. Serialized flat, as the store keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldBadge {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    #[serde(
        default,
        deserialize_with = "lenient_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub level: Option<BadgeLevel>,
}

impl HeldBadge {
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    pub fn trimmed_name(&self) -> &str {
        self.entry.name().trim()
    }

    pub fn key(&self) -> &BadgeKey {
        &self.entry.key
    }

    pub fn category(&self) -> &str {
        &self.entry.key.category
    }

    pub fn sub_category(&self) -> &str {
        &self.entry.key.sub_category
    }

    pub fn is_advanced(&self) -> bool {
        self.level == Some(BadgeLevel::Advanced)
    }

    /// `(category, subCategory, badgeKey, level)` identity used by toggling.
    pub fn selection_key(&self) -> SelectionKey {
        SelectionKey {
            key: self.entry.key.clone(),
            level: self.level,
        }
    }
}

/// Identity of one selected badge record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionKey {
    #[serde(flatten)]
    pub key: BadgeKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<BadgeLevel>,
}

/// A member's badge list. `null` or a non-list reads as empty and entries that do not
/// parse are dropped with a warning.
pub fn held_badges<'de, D>(deserializer: D) -> Result<Vec<HeldBadge>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<HeldBadge>(entry) {
            Ok(badge) => Some(badge),
            Err(err) => {
                warn!(index, %err, "skipping malformed held badge");
                None
            }
        })
        .collect())
}

fn lenient_level<'de, D>(deserializer: D) -> Result<Option<BadgeLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(BadgeLevel::parse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn held_badge_reads_flat_store_shape() {
        let badge: HeldBadge = serde_json::from_value(json!({
            "name": "Drill",
            "description": { "Basic": "March in step", "Advanced": "Lead a squad" },
            "category": "proficiencyAwards",
            "subCategory": "compulsory",
            "badgeKey": "drill",
            "level": " advanced "
        }))
        .expect("held badge parses");

        assert_eq!(badge.name(), "Drill");
        assert_eq!(badge.sub_category(), COMPULSORY);
        assert_eq!(badge.level, Some(BadgeLevel::Advanced));
        assert_eq!(
            badge.entry.definition.description.for_level(badge.level),
            Some("Lead a squad")
        );
    }

    #[test]
    fn unknown_level_is_treated_as_absent() {
        let badge: HeldBadge = serde_json::from_value(json!({
            "name": "Swimming",
            "description": "Swim",
            "category": "proficiencyAwards",
            "subCategory": "groupB",
            "badgeKey": "swim",
            "level": "Gold"
        }))
        .expect("held badge parses");

        assert!(badge.level.is_none());
    }

    #[test]
    fn service_badge_serializes_without_level() {
        let entry = CatalogEntry {
            key: BadgeKey::new(SERVICE_AWARDS, "service", "one-year"),
            definition: BadgeDefinition {
                name: ONE_YEAR_SERVICE.to_string(),
                description: BadgeDescription::Plain("A year of service".to_string()),
                points: None,
            },
        };

        let value = serde_json::to_value(entry.held(None)).expect("serializes");
        assert!(value.get("level").is_none());
        assert_eq!(value["badgeKey"], "one-year");
        assert_eq!(value["subCategory"], "service");
    }

    #[test]
    fn badge_without_location_still_reads() {
        let badge: HeldBadge = serde_json::from_value(json!({
            "name": "NCO Proficiency Star",
            "badgeKey": "nco",
            "category": "default",
            "description": ""
        }))
        .expect("held badge parses");

        assert_eq!(badge.name(), "NCO Proficiency Star");
        assert_eq!(badge.sub_category(), "");
        assert!(badge.level.is_none());
    }

    #[test]
    fn category_keys_round_trip() {
        for category in BadgeCategory::ALL {
            assert_eq!(BadgeCategory::from_key(category.key()), Some(category));
        }
        assert!(BadgeCategory::from_key("unknownAwards").is_none());
        assert!(BadgeCategory::Proficiency.has_levels());
        assert!(!BadgeCategory::Service.has_levels());
    }
}

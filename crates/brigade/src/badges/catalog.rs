use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::domain::{BadgeCategory, BadgeDefinition, BadgeDescription, BadgeKey, CatalogEntry};
use crate::store::{join_path, DataStore, StoreError};

/// Root path of the catalog tree in the store.
pub const BADGES_ROOT: &str = "badges";

type SubCategoryTree = BTreeMap<String, BTreeMap<String, BadgeDefinition>>;

/// Read-only view over `category -> subCategory -> badgeKey -> definition`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BadgeCatalog {
    tree: BTreeMap<String, SubCategoryTree>,
}

impl BadgeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the raw `badges` subtree. Entries that do not parse are skipped.
    pub fn from_tree(value: &Value) -> Self {
        let mut catalog = Self::new();
        let Some(categories) = value.as_object() else {
            return catalog;
        };

        for (category, subcategories) in categories {
            let Some(subcategories) = subcategories.as_object() else {
                warn!(%category, "catalog category is not an object; skipping");
                continue;
            };
            for (sub_category, badges) in subcategories {
                let Some(badges) = badges.as_object() else {
                    warn!(%category, %sub_category, "catalog subcategory is not an object; skipping");
                    continue;
                };
                for (badge_key, raw) in badges {
                    match serde_json::from_value::<BadgeDefinition>(raw.clone()) {
                        Ok(definition) => catalog.insert(
                            BadgeKey::new(category, sub_category, badge_key),
                            definition,
                        ),
                        Err(err) => {
                            warn!(%category, %sub_category, %badge_key, %err, "skipping malformed badge")
                        }
                    }
                }
            }
        }

        catalog
    }

    pub fn insert(&mut self, key: BadgeKey, definition: BadgeDefinition) {
        self.tree
            .entry(key.category)
            .or_default()
            .entry(key.sub_category)
            .or_default()
            .insert(key.badge_key, definition);
    }

    pub fn list_categories(&self) -> Vec<String> {
        self.tree.keys().cloned().collect()
    }

    pub fn list_subcategories(&self, category: &str) -> Vec<String> {
        self.tree
            .get(category)
            .map(|subs| subs.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn list_badges(&self, category: &str, sub_category: &str) -> BTreeMap<String, BadgeDefinition> {
        self.tree
            .get(category)
            .and_then(|subs| subs.get(sub_category))
            .cloned()
            .unwrap_or_default()
    }

    /// Badges of one subcategory with their catalog location attached.
    pub fn entries(&self, category: &str, sub_category: &str) -> Vec<CatalogEntry> {
        self.list_badges(category, sub_category)
            .into_iter()
            .map(|(badge_key, definition)| CatalogEntry {
                key: BadgeKey::new(category, sub_category, badge_key),
                definition,
            })
            .collect()
    }

    pub fn entry(&self, category: &str, sub_category: &str, badge_key: &str) -> Option<CatalogEntry> {
        self.tree
            .get(category)?
            .get(sub_category)?
            .get(badge_key)
            .map(|definition| CatalogEntry {
                key: BadgeKey::new(category, sub_category, badge_key),
                definition: definition.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.tree
            .values()
            .flat_map(|subs| subs.values())
            .map(|badges| badges.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Anything able to produce a fresh catalog snapshot.
pub trait CatalogSource: Send + Sync {
    fn fetch_catalog(&self) -> Result<BadgeCatalog, StoreError>;
}

impl<S: DataStore> CatalogSource for S {
    fn fetch_catalog(&self) -> Result<BadgeCatalog, StoreError> {
        Ok(self
            .get(BADGES_ROOT)?
            .map(|tree| BadgeCatalog::from_tree(&tree))
            .unwrap_or_default())
    }
}

/// Fetch-once cache over a catalog source with explicit invalidation.
pub struct CatalogCache<S> {
    source: Arc<S>,
    cached: RwLock<Option<Arc<BadgeCatalog>>>,
}

impl<S: CatalogSource> CatalogCache<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
        }
    }

    /// Cached catalog, fetched on first use.
    pub fn catalog(&self) -> Result<Arc<BadgeCatalog>, StoreError> {
        if let Some(catalog) = self.read_cached()? {
            return Ok(catalog);
        }
        self.refresh()
    }

    /// Drop the cached snapshot; the next `catalog()` call fetches again.
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.cached.write() {
            *guard = None;
        }
    }

    /// Fetch unconditionally and replace the cached snapshot.
    pub fn refresh(&self) -> Result<Arc<BadgeCatalog>, StoreError> {
        let catalog = Arc::new(self.source.fetch_catalog()?);
        debug!(badges = catalog.len(), "badge catalog fetched");
        let mut guard = self
            .cached
            .write()
            .map_err(|_| StoreError::Unavailable("catalog cache poisoned".to_string()))?;
        *guard = Some(catalog.clone());
        Ok(catalog)
    }

    fn read_cached(&self) -> Result<Option<Arc<BadgeCatalog>>, StoreError> {
        let guard = self
            .cached
            .read()
            .map_err(|_| StoreError::Unavailable("catalog cache poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

/// Administrator input for a new catalog badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBadge {
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub basic_description: Option<String>,
    #[serde(default)]
    pub advanced_description: Option<String>,
}

/// Reasons a catalog write is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Badge Name is required!")]
    MissingName,
    #[error("Both Basic and Advanced descriptions are required for Proficiency Awards!")]
    MissingLevelDescriptions,
    #[error("Description is required for Special and Service Awards!")]
    MissingDescription,
    #[error("unknown badge category '{0}'")]
    UnknownCategory(String),
    #[error("a subcategory is required")]
    MissingSubCategory,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

impl NewBadge {
    /// Validate and shape the definition that will be written to the store.
    pub fn into_definition(self) -> Result<(BadgeCategory, String, BadgeDefinition), CatalogError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::MissingName);
        }

        let category = BadgeCategory::from_key(self.category.trim())
            .ok_or_else(|| CatalogError::UnknownCategory(self.category.clone()))?;

        let sub_category = self.sub_category.trim().to_string();
        if sub_category.is_empty() {
            return Err(CatalogError::MissingSubCategory);
        }

        let description = if category.has_levels() {
            match (
                non_blank(&self.basic_description),
                non_blank(&self.advanced_description),
            ) {
                (Some(basic), Some(advanced)) => BadgeDescription::Levelled {
                    basic: Some(basic.to_string()),
                    advanced: Some(advanced.to_string()),
                },
                _ => return Err(CatalogError::MissingLevelDescriptions),
            }
        } else {
            match non_blank(&self.description) {
                Some(text) => BadgeDescription::Plain(text.to_string()),
                None => return Err(CatalogError::MissingDescription),
            }
        };

        Ok((
            category,
            sub_category,
            BadgeDefinition {
                name,
                description,
                points: None,
            },
        ))
    }
}

/// Store path of a subcategory, where new badges are pushed.
pub fn subcategory_path(category: &str, sub_category: &str) -> String {
    join_path(&[BADGES_ROOT, category, sub_category])
}

/// Store path of one catalog entry.
pub fn badge_path(key: &BadgeKey) -> String {
    join_path(&[BADGES_ROOT, &key.category, &key.sub_category, &key.badge_key])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::domain::{PROFICIENCY_AWARDS, SERVICE_AWARDS};
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn catalog_tree() -> Value {
        json!({
            "proficiencyAwards": {
                "groupA": {
                    "first-aid": { "name": "First Aid", "description": { "Basic": "b", "Advanced": "a" } },
                    "broken": 42
                },
                "compulsory": {
                    "drill": { "name": "Drill", "description": { "Basic": "b", "Advanced": "a" } }
                }
            },
            "serviceAwards": {
                "service": {
                    "one-year": { "name": "One Year Service", "description": "Served a year" }
                }
            }
        })
    }

    #[test]
    fn builds_tree_and_skips_malformed_entries() {
        let catalog = BadgeCatalog::from_tree(&catalog_tree());

        assert_eq!(
            catalog.list_categories(),
            vec![PROFICIENCY_AWARDS.to_string(), SERVICE_AWARDS.to_string()]
        );
        assert_eq!(
            catalog.list_subcategories(PROFICIENCY_AWARDS),
            vec!["compulsory".to_string(), "groupA".to_string()]
        );
        let group_a = catalog.list_badges(PROFICIENCY_AWARDS, "groupA");
        assert_eq!(group_a.len(), 1);
        assert_eq!(group_a["first-aid"].name, "First Aid");
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn missing_paths_are_empty() {
        let catalog = BadgeCatalog::from_tree(&catalog_tree());
        assert!(catalog.list_subcategories("specialAwards").is_empty());
        assert!(catalog.list_badges(PROFICIENCY_AWARDS, "groupZ").is_empty());
        assert!(catalog.entry(PROFICIENCY_AWARDS, "groupA", "nope").is_none());
        assert!(BadgeCatalog::from_tree(&json!("not a tree")).is_empty());
    }

    #[test]
    fn entries_carry_their_location() {
        let catalog = BadgeCatalog::from_tree(&catalog_tree());
        let entries = catalog.entries(SERVICE_AWARDS, "service");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, BadgeKey::new(SERVICE_AWARDS, "service", "one-year"));
    }

    struct CountingSource {
        fetches: AtomicUsize,
    }

    impl CatalogSource for CountingSource {
        fn fetch_catalog(&self) -> Result<BadgeCatalog, StoreError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(BadgeCatalog::from_tree(&catalog_tree()))
        }
    }

    #[test]
    fn cache_fetches_once_until_invalidated() {
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
        });
        let cache = CatalogCache::new(source.clone());

        cache.catalog().expect("first fetch");
        cache.catalog().expect("cached");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        cache.invalidate();
        cache.catalog().expect("refetch");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);

        cache.refresh().expect("forced refresh");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn store_backed_source_reads_badges_root() {
        let store = Arc::new(MemoryStore::from_value(json!({ "badges": catalog_tree() })));
        let cache = CatalogCache::new(store);
        let catalog = cache.catalog().expect("catalog loads");
        assert!(catalog.entry(PROFICIENCY_AWARDS, "compulsory", "drill").is_some());
    }

    #[test]
    fn empty_store_gives_empty_catalog() {
        let cache = CatalogCache::new(Arc::new(MemoryStore::new()));
        assert!(cache.catalog().expect("catalog loads").is_empty());
    }

    #[test]
    fn new_proficiency_badge_requires_both_descriptions() {
        let badge = NewBadge {
            category: PROFICIENCY_AWARDS.to_string(),
            sub_category: "groupB".to_string(),
            name: "Swimming".to_string(),
            description: None,
            basic_description: Some("Swim 50m".to_string()),
            advanced_description: Some("  ".to_string()),
        };
        assert_eq!(
            badge.into_definition(),
            Err(CatalogError::MissingLevelDescriptions)
        );
    }

    #[test]
    fn new_service_badge_uses_plain_description() {
        let badge = NewBadge {
            category: SERVICE_AWARDS.to_string(),
            sub_category: "service".to_string(),
            name: " Long Service ".to_string(),
            description: Some("Five years".to_string()),
            basic_description: None,
            advanced_description: None,
        };
        let (category, sub, definition) = badge.into_definition().expect("valid badge");
        assert_eq!(category, BadgeCategory::Service);
        assert_eq!(sub, "service");
        assert_eq!(definition.name, "Long Service");
        assert_eq!(
            definition.description,
            BadgeDescription::Plain("Five years".to_string())
        );
    }

    #[test]
    fn new_badge_requires_a_name() {
        let badge = NewBadge {
            category: SERVICE_AWARDS.to_string(),
            sub_category: "service".to_string(),
            name: "   ".to_string(),
            description: Some("x".to_string()),
            basic_description: None,
            advanced_description: None,
        };
        assert_eq!(badge.into_definition(), Err(CatalogError::MissingName));
    }
}

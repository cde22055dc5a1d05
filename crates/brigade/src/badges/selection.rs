//! Category → subcategory → badge picker that attaches catalog badges to a member.
//!
//! All navigation goes through [`BadgeSelection::apply`]. A rejected event leaves the
//! selection exactly as it was.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::BadgeCatalog;
use super::domain::{BadgeLevel, CatalogEntry, HeldBadge, SelectionKey, ONE_YEAR_SERVICE};

/// Maximum number of years recorded in one "One Year Service" commit.
pub const MAX_SERVICE_YEARS: u8 = 10;

/// Behavior switches for the picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Choosing Advanced also records Basic when the member does not hold it yet.
    pub backfill_basic: bool,
}

/// Where the picker currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum SelectionState {
    Browsing {
        category: Option<String>,
        sub_category: Option<String>,
    },
    LevelPrompt {
        badge: CatalogEntry,
    },
    CountPrompt {
        badge: CatalogEntry,
    },
}

impl SelectionState {
    fn root() -> Self {
        SelectionState::Browsing {
            category: None,
            sub_category: None,
        }
    }
}

/// Operator input driving the picker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum SelectionEvent {
    SelectCategory(String),
    SelectSubCategory(String),
    SelectBadge(String),
    ChooseLevel(BadgeLevel),
    ChooseCount(u8),
    Back,
    Toggle(SelectionKey),
    RemoveAt(usize),
}

/// What an accepted event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Navigated,
    Prompted,
    Added(Vec<HeldBadge>),
    Removed(Vec<HeldBadge>),
    Unchanged,
}

/// User-facing reasons an event is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("badge category '{0}' does not exist")]
    UnknownCategory(String),
    #[error("subcategory '{sub_category}' does not exist in {category}")]
    UnknownSubCategory {
        category: String,
        sub_category: String,
    },
    #[error("badge '{0}' is not in the current list")]
    UnknownBadge(String),
    #[error("You already have both Basic and Advanced levels for this badge.")]
    BothLevelsHeld { name: String },
    #[error("You already have the {level} level for this badge.")]
    LevelAlreadyHeld { name: String, level: BadgeLevel },
    #[error("Please choose between 1 and 10 years of service.")]
    InvalidCount(u8),
    #[error("there is no badge at position {0}")]
    NoSuchIndex(usize),
    #[error("{event} is not available on this screen")]
    InvalidTransition { event: &'static str },
}

/// Picker state plus the member's (or draft's) badge list it edits.
#[derive(Debug, Clone)]
pub struct BadgeSelection {
    catalog: Arc<BadgeCatalog>,
    config: SelectionConfig,
    state: SelectionState,
    subcategories: Vec<String>,
    visible: Vec<CatalogEntry>,
    selected: Vec<HeldBadge>,
}

impl BadgeSelection {
    pub fn new(catalog: Arc<BadgeCatalog>, config: SelectionConfig) -> Self {
        Self::with_existing(catalog, config, Vec::new())
    }

    /// Start from badges the member already holds.
    pub fn with_existing(
        catalog: Arc<BadgeCatalog>,
        config: SelectionConfig,
        existing: Vec<HeldBadge>,
    ) -> Self {
        Self {
            catalog,
            config,
            state: SelectionState::root(),
            subcategories: Vec::new(),
            visible: Vec::new(),
            selected: existing,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn categories(&self) -> Vec<String> {
        self.catalog.list_categories()
    }

    pub fn subcategories(&self) -> &[String] {
        &self.subcategories
    }

    pub fn visible_badges(&self) -> &[CatalogEntry] {
        &self.visible
    }

    pub fn selected(&self) -> &[HeldBadge] {
        &self.selected
    }

    pub fn into_selected(self) -> Vec<HeldBadge> {
        self.selected
    }

    /// Single reducer for every picker transition.
    pub fn apply(&mut self, event: SelectionEvent) -> Result<SelectionOutcome, SelectionError> {
        debug!(?event, state = ?self.state, "badge selection event");
        match event {
            SelectionEvent::SelectCategory(category) => self.select_category(category),
            SelectionEvent::SelectSubCategory(sub) => self.select_sub_category(sub),
            SelectionEvent::SelectBadge(badge_key) => self.select_badge(&badge_key),
            SelectionEvent::ChooseLevel(level) => self.choose_level(level),
            SelectionEvent::ChooseCount(count) => self.choose_count(count),
            SelectionEvent::Back => Ok(self.back()),
            SelectionEvent::Toggle(key) => self.toggle(&key),
            SelectionEvent::RemoveAt(index) => self.remove_at(index),
        }
    }

    fn select_category(&mut self, category: String) -> Result<SelectionOutcome, SelectionError> {
        if !matches!(
            self.state,
            SelectionState::Browsing { category: None, .. }
        ) {
            return Err(SelectionError::InvalidTransition {
                event: "selecting a category",
            });
        }

        let subcategories = self.catalog.list_subcategories(&category);
        if subcategories.is_empty() && !self.catalog.list_categories().contains(&category) {
            return Err(SelectionError::UnknownCategory(category));
        }

        self.subcategories = subcategories;
        self.state = SelectionState::Browsing {
            category: Some(category),
            sub_category: None,
        };
        Ok(SelectionOutcome::Navigated)
    }

    fn select_sub_category(&mut self, sub: String) -> Result<SelectionOutcome, SelectionError> {
        let category = match &self.state {
            SelectionState::Browsing {
                category: Some(category),
                sub_category: None,
            } => category.clone(),
            _ => {
                return Err(SelectionError::InvalidTransition {
                    event: "selecting a subcategory",
                })
            }
        };

        if !self.subcategories.contains(&sub) {
            return Err(SelectionError::UnknownSubCategory {
                category,
                sub_category: sub,
            });
        }

        self.visible = self.catalog.entries(&category, &sub);
        self.state = SelectionState::Browsing {
            category: Some(category),
            sub_category: Some(sub),
        };
        Ok(SelectionOutcome::Navigated)
    }

    fn select_badge(&mut self, badge_key: &str) -> Result<SelectionOutcome, SelectionError> {
        if !matches!(
            self.state,
            SelectionState::Browsing {
                category: Some(_),
                sub_category: Some(_),
            }
        ) {
            return Err(SelectionError::InvalidTransition {
                event: "selecting a badge",
            });
        }

        let badge = self
            .visible
            .iter()
            .find(|entry| entry.key.badge_key == badge_key)
            .cloned()
            .ok_or_else(|| SelectionError::UnknownBadge(badge_key.to_string()))?;

        if badge.name().trim() == ONE_YEAR_SERVICE {
            self.state = SelectionState::CountPrompt { badge };
            return Ok(SelectionOutcome::Prompted);
        }

        if badge.key.is_proficiency() {
            let name = badge.name().to_string();
            if self.holds_level(&name, BadgeLevel::Basic)
                && self.holds_level(&name, BadgeLevel::Advanced)
            {
                return Err(SelectionError::BothLevelsHeld { name });
            }
            self.state = SelectionState::LevelPrompt { badge };
            return Ok(SelectionOutcome::Prompted);
        }

        self.toggle(&SelectionKey {
            key: badge.key,
            level: None,
        })
    }

    fn choose_level(&mut self, level: BadgeLevel) -> Result<SelectionOutcome, SelectionError> {
        let SelectionState::LevelPrompt { badge } = &self.state else {
            return Err(SelectionError::InvalidTransition {
                event: "choosing a level",
            });
        };
        let badge = badge.clone();
        let name = badge.name().to_string();

        if self.holds_level(&name, level) {
            return Err(SelectionError::LevelAlreadyHeld { name, level });
        }

        let mut added = Vec::new();
        if level == BadgeLevel::Advanced
            && self.config.backfill_basic
            && !self.holds_level(&name, BadgeLevel::Basic)
        {
            added.push(badge.clone().held(Some(BadgeLevel::Basic)));
        }
        added.push(badge.held(Some(level)));

        self.selected.extend(added.iter().cloned());
        self.return_to_list();
        Ok(SelectionOutcome::Added(added))
    }

    fn choose_count(&mut self, count: u8) -> Result<SelectionOutcome, SelectionError> {
        let SelectionState::CountPrompt { badge } = &self.state else {
            return Err(SelectionError::InvalidTransition {
                event: "choosing a count",
            });
        };
        if !(1..=MAX_SERVICE_YEARS).contains(&count) {
            return Err(SelectionError::InvalidCount(count));
        }

        let added: Vec<HeldBadge> = (0..count).map(|_| badge.clone().held(None)).collect();
        self.selected.extend(added.iter().cloned());
        self.return_to_list();
        Ok(SelectionOutcome::Added(added))
    }

    fn back(&mut self) -> SelectionOutcome {
        match &self.state {
            SelectionState::LevelPrompt { .. } | SelectionState::CountPrompt { .. } => {
                self.return_to_list();
                SelectionOutcome::Navigated
            }
            SelectionState::Browsing {
                category: Some(category),
                sub_category: Some(_),
            } => {
                let category = category.clone();
                self.visible.clear();
                self.state = SelectionState::Browsing {
                    category: Some(category),
                    sub_category: None,
                };
                SelectionOutcome::Navigated
            }
            SelectionState::Browsing {
                category: Some(_),
                sub_category: None,
            } => {
                self.subcategories.clear();
                self.state = SelectionState::root();
                SelectionOutcome::Navigated
            }
            SelectionState::Browsing { category: None, .. } => SelectionOutcome::Unchanged,
        }
    }

    /// Remove every record matching `key`, or add it from the catalog when absent.
    pub fn toggle(&mut self, key: &SelectionKey) -> Result<SelectionOutcome, SelectionError> {
        let (removed, kept): (Vec<HeldBadge>, Vec<HeldBadge>) = self
            .selected
            .drain(..)
            .partition(|held| held.selection_key() == *key);
        self.selected = kept;

        if !removed.is_empty() {
            return Ok(SelectionOutcome::Removed(removed));
        }

        let entry = self
            .catalog
            .entry(&key.key.category, &key.key.sub_category, &key.key.badge_key)
            .ok_or_else(|| SelectionError::UnknownBadge(key.key.badge_key.clone()))?;
        let level = if entry.key.is_proficiency() { key.level } else { None };
        let held = entry.held(level);
        self.selected.push(held.clone());
        Ok(SelectionOutcome::Added(vec![held]))
    }

    /// Index-based removal from the selected list.
    pub fn remove_at(&mut self, index: usize) -> Result<SelectionOutcome, SelectionError> {
        if index >= self.selected.len() {
            return Err(SelectionError::NoSuchIndex(index));
        }
        let removed = self.selected.remove(index);
        Ok(SelectionOutcome::Removed(vec![removed]))
    }

    fn holds_level(&self, name: &str, level: BadgeLevel) -> bool {
        self.selected
            .iter()
            .any(|held| held.name() == name && held.level == Some(level))
    }

    fn return_to_list(&mut self) {
        let (category, sub_category) = match self.visible.first() {
            Some(entry) => (
                Some(entry.key.category.clone()),
                Some(entry.key.sub_category.clone()),
            ),
            None => (None, None),
        };
        self.state = SelectionState::Browsing {
            category,
            sub_category,
        };
    }
}

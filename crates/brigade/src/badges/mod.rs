//! Badge catalog, held-badge records and the selection flow that edits them.

pub mod catalog;
pub mod domain;
pub mod selection;

#[cfg(test)]
mod tests;

pub use catalog::{
    BadgeCatalog, CatalogCache, CatalogError, CatalogSource, NewBadge, BADGES_ROOT,
};
pub use domain::{
    held_badges, BadgeCategory, BadgeDefinition, BadgeDescription, BadgeKey, BadgeLevel,
    BadgePoints, CatalogEntry, HeldBadge, SelectionKey, COMPULSORY, ONE_YEAR_SERVICE,
    PROFICIENCY_AWARDS, SERVICE_AWARDS, SPECIAL_AWARDS,
};
pub use selection::{
    BadgeSelection, SelectionConfig, SelectionError, SelectionEvent, SelectionOutcome,
    SelectionState, MAX_SERVICE_YEARS,
};

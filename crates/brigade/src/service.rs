use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::{info, warn};

use crate::attendance::{
    self, aggregate, flatten_tree, AttendanceRecord, AttendanceStats, MemberAttendance,
    RosterEntry, SquadFilter, ATTENDANCE_ROOT,
};
use crate::badges::catalog::{badge_path, subcategory_path};
use crate::badges::{
    BadgeCatalog, BadgeKey, BadgeSelection, CatalogCache, CatalogEntry, CatalogError, HeldBadge,
    NewBadge, SelectionConfig, SelectionError, SelectionEvent,
};
use crate::config::RosterConfig;
use crate::eligibility::{EligibilityConfig, EligibilityEngine, EligibilityReport};
use crate::members::{member_path, Member, MemberValidationError, NewMember, USERS_ROOT};
use crate::parades::{
    month_path, validate_new_parade, NewParade, ParadeSchedule, ParadeValidationError,
    PARADES_ROOT,
};
use crate::store::{DataStore, StoreError};

/// Knobs the service needs from configuration.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub eligibility: EligibilityConfig,
    pub selection: SelectionConfig,
    pub season_year: i32,
}

impl ServiceSettings {
    pub fn from_roster(roster: &RosterConfig) -> Self {
        Self {
            eligibility: EligibilityConfig::default(),
            selection: SelectionConfig {
                backfill_basic: roster.backfill_basic,
            },
            season_year: roster.season_year,
        }
    }
}

/// Facade composing the store, the catalog cache and the eligibility engine.
pub struct BrigadeService<S> {
    store: Arc<S>,
    catalog: CatalogCache<S>,
    engine: Arc<EligibilityEngine>,
    selection: SelectionConfig,
    season_year: i32,
}

impl<S> BrigadeService<S>
where
    S: DataStore + 'static,
{
    pub fn new(store: Arc<S>, settings: ServiceSettings) -> Self {
        Self {
            catalog: CatalogCache::new(store.clone()),
            store,
            engine: Arc::new(EligibilityEngine::new(settings.eligibility)),
            selection: settings.selection,
            season_year: settings.season_year,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn season_year(&self) -> i32 {
        self.season_year
    }

    pub fn catalog(&self) -> Result<Arc<BadgeCatalog>, ServiceError> {
        Ok(self.catalog.catalog()?)
    }

    pub fn refresh_catalog(&self) -> Result<Arc<BadgeCatalog>, ServiceError> {
        Ok(self.catalog.refresh()?)
    }

    /// Validate and push a new catalog badge under its subcategory.
    pub fn add_badge(&self, badge: NewBadge) -> Result<CatalogEntry, ServiceError> {
        let (category, sub_category, definition) = badge.into_definition()?;
        let value = serde_json::to_value(&definition).map_err(StoreError::from)?;
        let badge_key = self
            .store
            .push(&subcategory_path(category.key(), &sub_category), value)?;
        self.catalog.invalidate();

        info!(category = category.key(), %sub_category, %badge_key, name = %definition.name, "catalog badge added");
        Ok(CatalogEntry {
            key: BadgeKey::new(category.key(), sub_category, badge_key),
            definition,
        })
    }

    pub fn delete_badge(&self, key: &BadgeKey) -> Result<(), ServiceError> {
        self.store.delete(&badge_path(key))?;
        self.catalog.invalidate();
        info!(category = %key.category, sub_category = %key.sub_category, badge_key = %key.badge_key, "catalog badge deleted");
        Ok(())
    }

    pub fn create_member(&self, input: NewMember, today: NaiveDate) -> Result<Member, ServiceError> {
        let member = input.validate(today)?;
        self.save_member(&member)?;
        info!(member_id = %member.id, name = %member.name, "member created");
        Ok(member)
    }

    pub fn get_member(&self, id: &str) -> Result<Member, ServiceError> {
        let path = member_path(id);
        let value = self
            .store
            .get(&path)?
            .ok_or_else(|| ServiceError::NotFound(format!("member '{id}'")))?;
        let mut member: Member = serde_json::from_value(value)
            .map_err(|source| ServiceError::MalformedRecord { path, source })?;
        if member.id.is_empty() {
            member.id = id.to_string();
        }
        Ok(member)
    }

    /// All readable members, sorted by name. Records that fail to parse are skipped.
    pub fn list_members(&self) -> Result<Vec<Member>, ServiceError> {
        let Some(Value::Object(users)) = self.store.get(USERS_ROOT)? else {
            return Ok(Vec::new());
        };

        let mut members: Vec<Member> = users
            .into_iter()
            .filter_map(|(id, raw)| match serde_json::from_value::<Member>(raw) {
                Ok(mut member) => {
                    if member.id.is_empty() {
                        member.id = id;
                    }
                    Some(member)
                }
                Err(err) => {
                    warn!(member_id = %id, %err, "skipping malformed member record");
                    None
                }
            })
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }

    pub fn delete_member(&self, id: &str) -> Result<(), ServiceError> {
        self.get_member(id)?;
        self.store.delete(&member_path(id))?;
        info!(member_id = %id, "member deleted");
        Ok(())
    }

    /// Run selection events against a member's badges and persist the result.
    ///
    /// Nothing is written if any event is rejected.
    pub fn apply_badge_selection(
        &self,
        id: &str,
        events: Vec<SelectionEvent>,
    ) -> Result<Vec<HeldBadge>, ServiceError> {
        let mut member = self.get_member(id)?;
        let mut selection =
            BadgeSelection::with_existing(self.catalog()?, self.selection, member.badges);
        for event in events {
            selection.apply(event)?;
        }

        member.badges = selection.into_selected();
        self.store.update(
            &member_path(id),
            serde_json::json!({ "badges": serde_json::to_value(&member.badges).map_err(StoreError::from)? }),
        )?;
        info!(member_id = %id, badges = member.badges.len(), "member badges updated");
        Ok(member.badges)
    }

    pub fn evaluate_member(&self, id: &str, today: NaiveDate) -> Result<EligibilityReport, ServiceError> {
        let member = self.get_member(id)?;
        Ok(self
            .engine
            .evaluate(&member.badges, &member.year_joined, today))
    }

    /// Upsert one attendance record at its storage key.
    pub fn mark_attendance(&self, record: AttendanceRecord) -> Result<String, ServiceError> {
        let key = record.storage_key();
        let value = serde_json::to_value(&record).map_err(StoreError::from)?;
        self.store.write(&attendance::attendance_path(&record), value)?;
        info!(%key, status = %record.status, "attendance marked");
        Ok(key)
    }

    pub fn attendance_records(&self) -> Result<Vec<AttendanceRecord>, ServiceError> {
        Ok(self
            .store
            .get(ATTENDANCE_ROOT)?
            .map(|tree| flatten_tree(&tree))
            .unwrap_or_default())
    }

    pub fn attendance_stats(
        &self,
        date: NaiveDate,
        filter: SquadFilter,
    ) -> Result<AttendanceStats, ServiceError> {
        Ok(aggregate(&self.attendance_records()?, date, filter))
    }

    pub fn parade_schedule(&self) -> Result<ParadeSchedule, ServiceError> {
        Ok(self
            .store
            .get(PARADES_ROOT)?
            .map(|tree| ParadeSchedule::from_tree(&tree))
            .unwrap_or_default())
    }

    pub fn schedule_parade(&self, parade: NewParade, now: NaiveDateTime) -> Result<String, ServiceError> {
        let entry = validate_new_parade(&parade, now, self.season_year)?;
        let value = serde_json::to_value(&entry).map_err(StoreError::from)?;
        let key = self.store.push(&month_path(&parade.month), value)?;
        info!(month = %parade.month, date = %entry.date, %key, "parade scheduled");
        Ok(key)
    }

    /// Season attendance rate for every member against the parade calendar.
    pub fn parade_rates(&self) -> Result<Vec<MemberAttendance>, ServiceError> {
        let roster: Vec<RosterEntry> = self.list_members()?.iter().map(RosterEntry::from).collect();
        let total = self.parade_schedule()?.total();
        Ok(attendance::member_parade_rates(
            &roster,
            &self.attendance_records()?,
            total,
        ))
    }

    fn save_member(&self, member: &Member) -> Result<(), ServiceError> {
        let value = serde_json::to_value(member).map_err(StoreError::from)?;
        self.store.write(&member_path(&member.id), value)?;
        Ok(())
    }
}

/// Error raised by the brigade service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Member(#[from] MemberValidationError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Parade(#[from] ParadeValidationError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("record at '{path}' could not be read: {source}")]
    MalformedRecord {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Validation and selection failures are the caller's to fix.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServiceError::Member(_)
                | ServiceError::Catalog(_)
                | ServiceError::Selection(_)
                | ServiceError::Parade(_)
        )
    }
}

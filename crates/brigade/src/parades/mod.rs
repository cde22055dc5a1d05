//! Parade calendar stored as `parades/{month}/{key} -> { date }`.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PARADES_ROOT: &str = "parades";

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Format of the `date` field written by the scheduling form.
pub const PARADE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parades grouped by month name, keyed by store key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParadeSchedule {
    months: BTreeMap<String, BTreeMap<String, Option<NaiveDateTime>>>,
}

impl ParadeSchedule {
    pub fn from_tree(value: &Value) -> Self {
        let mut months = BTreeMap::new();
        if let Some(tree) = value.as_object() {
            for (month, parades) in tree {
                let Some(parades) = parades.as_object() else {
                    continue;
                };
                let entries = parades
                    .iter()
                    .map(|(key, parade)| {
                        let date = parade
                            .get("date")
                            .and_then(Value::as_str)
                            .and_then(parse_parade_date);
                        (key.clone(), date)
                    })
                    .collect();
                months.insert(month.clone(), entries);
            }
        }
        Self { months }
    }

    /// Parades recorded under `month`, counted by key.
    pub fn count_for(&self, month: &str) -> usize {
        self.months.get(month).map_or(0, BTreeMap::len)
    }

    pub fn total(&self) -> usize {
        self.months.values().map(BTreeMap::len).sum()
    }

    /// Every readable parade date, earliest first.
    pub fn dates(&self) -> Vec<NaiveDateTime> {
        let mut dates: Vec<NaiveDateTime> = self
            .months
            .values()
            .flat_map(|parades| parades.values().flatten().copied())
            .collect();
        dates.sort();
        dates
    }

    pub fn months(&self) -> impl Iterator<Item = &str> {
        self.months.keys().map(String::as_str)
    }
}

/// Accepts the form's `YYYY-MM-DDTHH:MM`, seconds, or RFC 3339.
pub fn parse_parade_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(trimmed, PARADE_DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Request body for scheduling a parade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParade {
    pub month: String,
    pub date: String,
}

/// Value written under `parades/{month}/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParadeEntry {
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParadeValidationError {
    #[error("Please select a valid month.")]
    InvalidMonth,
    #[error("Parade date is required.")]
    MissingDate,
    #[error("Parade date must be in the future.")]
    NotInFuture,
    #[error("The parade must be scheduled for {0}.")]
    WrongSeason(i32),
}

/// Check a new parade and return the entry to store.
pub fn validate_new_parade(
    parade: &NewParade,
    now: NaiveDateTime,
    season_year: i32,
) -> Result<ParadeEntry, ParadeValidationError> {
    if !MONTHS.contains(&parade.month.as_str()) {
        return Err(ParadeValidationError::InvalidMonth);
    }
    if parade.date.trim().is_empty() {
        return Err(ParadeValidationError::MissingDate);
    }
    let scheduled = parse_parade_date(&parade.date).ok_or(ParadeValidationError::MissingDate)?;
    if scheduled <= now {
        return Err(ParadeValidationError::NotInFuture);
    }
    if scheduled.year() != season_year {
        return Err(ParadeValidationError::WrongSeason(season_year));
    }
    Ok(ParadeEntry {
        date: scheduled.format(PARADE_DATE_FORMAT).to_string(),
    })
}

pub fn month_path(month: &str) -> String {
    crate::store::join_path(&[PARADES_ROOT, month])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(raw: &str) -> NaiveDateTime {
        parse_parade_date(raw).expect("valid datetime")
    }

    fn parade(month: &str, date: &str) -> NewParade {
        NewParade {
            month: month.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn schedule_counts_keys_and_sorts_dates() {
        let schedule = ParadeSchedule::from_tree(&json!({
            "March": {
                "p2": { "date": "2025-03-15T09:00" },
                "p1": { "date": "2025-03-01T09:00:00" }
            },
            "January": {
                "p0": { "date": "2025-01-11T08:30:00.000Z" },
                "bad": { "date": "soon" }
            }
        }));

        assert_eq!(schedule.count_for("March"), 2);
        assert_eq!(schedule.count_for("January"), 2);
        assert_eq!(schedule.count_for("May"), 0);
        assert_eq!(schedule.total(), 4);
        assert_eq!(
            schedule.dates(),
            vec![at("2025-01-11T08:30"), at("2025-03-01T09:00"), at("2025-03-15T09:00")]
        );
    }

    #[test]
    fn empty_tree_has_no_parades() {
        let schedule = ParadeSchedule::from_tree(&Value::Null);
        assert_eq!(schedule.total(), 0);
        assert!(schedule.dates().is_empty());
    }

    #[test]
    fn new_parade_must_name_a_real_month() {
        let now = at("2025-01-01T00:00");
        assert_eq!(
            validate_new_parade(&parade("Marchember", "2025-03-01T09:00"), now, 2025),
            Err(ParadeValidationError::InvalidMonth)
        );
        assert_eq!(
            validate_new_parade(&parade("March", "  "), now, 2025),
            Err(ParadeValidationError::MissingDate)
        );
    }

    #[test]
    fn new_parade_must_be_future_and_in_season() {
        let now = at("2025-06-01T12:00");
        assert_eq!(
            validate_new_parade(&parade("May", "2025-05-03T09:00"), now, 2025),
            Err(ParadeValidationError::NotInFuture)
        );
        assert_eq!(
            validate_new_parade(&parade("January", "2026-01-10T09:00"), now, 2025),
            Err(ParadeValidationError::WrongSeason(2025))
        );

        let entry = validate_new_parade(&parade("July", "2025-07-05T09:00"), now, 2025)
            .expect("valid parade");
        assert_eq!(entry.date, "2025-07-05T09:00");
    }
}

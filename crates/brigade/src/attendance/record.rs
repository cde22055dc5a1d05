use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Parade status. Stored strings outside the three known ones are kept verbatim as
/// [`AttendanceStatus::Other`] so they still count toward a day's total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Excused,
    Other(String),
}

impl AttendanceStatus {
    /// Case-insensitive; never fails.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "present" => AttendanceStatus::Present,
            "absent" => AttendanceStatus::Absent,
            "excused" => AttendanceStatus::Excused,
            _ => AttendanceStatus::Other(raw.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, AttendanceStatus::Other(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Excused => "excused",
            AttendanceStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for AttendanceStatus {
    fn from(raw: String) -> Self {
        AttendanceStatus::parse(&raw)
    }
}

impl From<AttendanceStatus> for String {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One member's status at one parade, stored under `attendance/{storage_key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub member_name: String,
    #[serde(default)]
    pub squad_name: String,
    #[serde(default = "missing_status", deserialize_with = "lenient_status")]
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AttendanceRecord {
    /// `date_squadName_memberName`; one record per member per day.
    pub fn storage_key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.date.format("%Y-%m-%d"),
            self.squad_name,
            self.member_name
        )
    }
}

fn missing_status() -> AttendanceStatus {
    AttendanceStatus::Other(String::new())
}

fn lenient_status<'de, D>(deserializer: D) -> Result<AttendanceStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => AttendanceStatus::parse(&raw),
        Value::Null => missing_status(),
        other => AttendanceStatus::Other(other.to_string()),
    })
}

/// Read the store's `attendance` subtree.
///
/// Children are either records (they carry a `status`) or one extra level of records.
/// Anything that does not parse is skipped.
pub fn flatten_tree(value: &Value) -> Vec<AttendanceRecord> {
    let Some(entries) = value.as_object() else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for (key, entry) in entries {
        let Some(fields) = entry.as_object() else {
            continue;
        };
        if fields.contains_key("status") {
            push_parsed(&mut records, key, entry);
        } else {
            for (nested_key, nested) in fields {
                push_parsed(&mut records, &format!("{key}_{nested_key}"), nested);
            }
        }
    }
    records
}

fn push_parsed(records: &mut Vec<AttendanceRecord>, key: &str, raw: &Value) {
    match serde_json::from_value::<AttendanceRecord>(raw.clone()) {
        Ok(record) => records.push(record),
        Err(err) => warn!(%key, %err, "skipping malformed attendance record"),
    }
}

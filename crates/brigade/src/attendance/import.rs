use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::record::{AttendanceRecord, AttendanceStatus};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: unknown status '{value}'")]
    InvalidStatus { row: usize, value: String },
}

/// Parse attendance rows with headers
/// `date,memberId,memberName,squadName,status[,rank][,notes]`.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<AttendanceRecord>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<AttendanceRow>().enumerate() {
        let row = row?;
        let line = index + 2;

        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|_| {
            ImportError::InvalidDate {
                row: line,
                value: row.date.clone(),
            }
        })?;
        let status = AttendanceStatus::parse(&row.status);
        if !status.is_known() {
            return Err(ImportError::InvalidStatus {
                row: line,
                value: row.status,
            });
        }

        records.push(AttendanceRecord {
            date,
            member_id: row.member_id,
            member_name: row.member_name,
            squad_name: row.squad_name,
            status,
            rank: row.rank,
            notes: row.notes,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceRow {
    date: String,
    #[serde(default)]
    member_id: String,
    #[serde(default)]
    member_name: String,
    #[serde(default)]
    squad_name: String,
    status: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rank: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    notes: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

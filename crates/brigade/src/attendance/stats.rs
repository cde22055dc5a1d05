use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::{AttendanceRecord, AttendanceStatus};
use crate::members::Member;

/// Squad selector for the daily statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SquadFilter {
    #[default]
    All,
    Squad(u8),
}

impl SquadFilter {
    pub fn matches(&self, squad_name: &str) -> bool {
        match self {
            SquadFilter::All => true,
            SquadFilter::Squad(number) => squad_name == format!("Squad {number}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("squad filter must be 'all' or a squad number, got '{0}'")]
pub struct InvalidSquadFilter(pub String);

impl FromStr for SquadFilter {
    type Err = InvalidSquadFilter;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(SquadFilter::All);
        }
        trimmed
            .parse::<u8>()
            .map(SquadFilter::Squad)
            .map_err(|_| InvalidSquadFilter(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub present: usize,
    pub absent: usize,
    pub excused: usize,
    pub total: usize,
}

impl AttendanceStats {
    fn record(&mut self, status: &AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Excused => self.excused += 1,
            AttendanceStatus::Other(_) => {}
        }
        self.total += 1;
    }
}

/// Status counts for one date, optionally narrowed to one squad.
pub fn aggregate(records: &[AttendanceRecord], date: NaiveDate, filter: SquadFilter) -> AttendanceStats {
    records
        .iter()
        .filter(|record| record.date == date && filter.matches(&record.squad_name))
        .fold(AttendanceStats::default(), |mut stats, record| {
            stats.record(&record.status);
            stats
        })
}

/// Latest record per member id for one date. Records without a member id are ignored.
pub fn attendance_by_member(
    records: &[AttendanceRecord],
    date: NaiveDate,
) -> HashMap<String, AttendanceRecord> {
    let mut by_member = HashMap::new();
    for record in records
        .iter()
        .filter(|record| record.date == date && !record.member_id.is_empty())
    {
        by_member.insert(record.member_id.clone(), record.clone());
    }
    by_member
}

/// Who the season rates are computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub squad_name: String,
}

impl From<&Member> for RosterEntry {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            squad_name: member.squad_name().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAttendance {
    pub member: RosterEntry,
    pub total_parades: usize,
    pub present: usize,
    pub absent: usize,
    pub excused: usize,
    pub attendance_rate: f64,
}

/// Season attendance per member, best rate first.
pub fn member_parade_rates(
    roster: &[RosterEntry],
    records: &[AttendanceRecord],
    total_parades: usize,
) -> Vec<MemberAttendance> {
    let mut rates: Vec<MemberAttendance> = roster
        .iter()
        .map(|member| {
            let mut stats = AttendanceStats::default();
            records
                .iter()
                .filter(|record| record.member_id == member.id || record.member_name == member.name)
                .for_each(|record| stats.record(&record.status));

            let attendance_rate = if total_parades == 0 {
                0.0
            } else {
                stats.present as f64 / total_parades as f64 * 100.0
            };

            MemberAttendance {
                member: member.clone(),
                total_parades,
                present: stats.present,
                absent: stats.absent,
                excused: stats.excused,
                attendance_rate,
            }
        })
        .collect();

    rates.sort_by(|a, b| b.attendance_rate.total_cmp(&a.attendance_rate));
    rates
}

//! Parade attendance: records, daily statistics and season rates.

mod import;
mod record;
mod stats;

pub use import::{parse_records, ImportError};
pub use record::{flatten_tree, AttendanceRecord, AttendanceStatus};
pub use stats::{
    aggregate, attendance_by_member, member_parade_rates, AttendanceStats, InvalidSquadFilter,
    MemberAttendance, RosterEntry, SquadFilter,
};

pub const ATTENDANCE_ROOT: &str = "attendance";

pub fn attendance_path(record: &AttendanceRecord) -> String {
    crate::store::join_path(&[ATTENDANCE_ROOT, &record.storage_key()])
}

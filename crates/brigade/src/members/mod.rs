//! Member records, enrolment validation and roster summaries.

mod domain;
mod roster;

pub use domain::{
    age_on, Member, MemberValidationError, NewMember, Platoon, Rank, Role, EARLIEST_JOINING_YEAR,
    MINIMUM_AGE,
};
pub use roster::{next_birthday, rank_counts, upcoming_birthdays, BirthdayWindow, UpcomingBirthday};

/// Store path of the member collection.
pub const USERS_ROOT: &str = "users";

pub fn member_path(id: &str) -> String {
    crate::store::join_path(&[USERS_ROOT, id])
}

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{Member, Rank};

/// Members per rank, leaving recruits out.
pub fn rank_counts(members: &[Member]) -> BTreeMap<Rank, usize> {
    let mut counts = BTreeMap::new();
    for rank in members
        .iter()
        .filter_map(|member| member.rank)
        .filter(|rank| *rank != Rank::Recruit)
    {
        *counts.entry(rank).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BirthdayWindow {
    Today,
    #[serde(rename = "This Week")]
    ThisWeek,
    Soon,
    Upcoming,
}

impl BirthdayWindow {
    pub fn for_days(days: i64) -> Self {
        match days {
            0 => BirthdayWindow::Today,
            1..=7 => BirthdayWindow::ThisWeek,
            8..=30 => BirthdayWindow::Soon,
            _ => BirthdayWindow::Upcoming,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingBirthday {
    pub member_id: String,
    pub name: String,
    pub next_birthday: NaiveDate,
    pub days_until: i64,
    pub window: BirthdayWindow,
}

/// Next occurrence of a birthday on or after `today`. Feb 29 falls back to Feb 28.
pub fn next_birthday(dob: NaiveDate, today: NaiveDate) -> NaiveDate {
    let in_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, dob.month(), dob.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, dob.month(), dob.day() - 1))
            .unwrap_or(today)
    };
    let this_year = in_year(today.year());
    if this_year >= today {
        this_year
    } else {
        in_year(today.year() + 1)
    }
}

/// Next birthday of everyone with a date of birth on file, soonest first.
pub fn upcoming_birthdays(members: &[Member], today: NaiveDate) -> Vec<UpcomingBirthday> {
    let mut upcoming: Vec<UpcomingBirthday> = members
        .iter()
        .filter_map(|member| member.dob.map(|dob| (member, dob)))
        .map(|(member, dob)| {
            let next = next_birthday(dob, today);
            let days_until = (next - today).num_days();
            UpcomingBirthday {
                member_id: member.id.clone(),
                name: member.name.clone(),
                next_birthday: next,
                days_until,
                window: BirthdayWindow::for_days(days_until),
            }
        })
        .collect();
    upcoming.sort_by(|a, b| a.days_until.cmp(&b.days_until).then_with(|| a.name.cmp(&b.name)));
    upcoming
}

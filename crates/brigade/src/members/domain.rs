use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::badges::{held_badges, HeldBadge};

/// Youngest age at which a member can be enrolled.
pub const MINIMUM_AGE: i32 = 13;
pub const EARLIEST_JOINING_YEAR: i32 = 1900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Recruit,
    Private,
    #[serde(rename = "Lance Corporal")]
    LanceCorporal,
    Corporal,
    Sergeant,
}

impl Rank {
    pub const ALL: [Rank; 5] = [
        Rank::Recruit,
        Rank::Private,
        Rank::LanceCorporal,
        Rank::Corporal,
        Rank::Sergeant,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Rank::Recruit => "Recruit",
            Rank::Private => "Private",
            Rank::LanceCorporal => "Lance Corporal",
            Rank::Corporal => "Corporal",
            Rank::Sergeant => "Sergeant",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|rank| rank.label().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Appointment held alongside the rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    None,
    #[serde(rename = "Drill Sergeant")]
    DrillSergeant,
    #[serde(rename = "Band Sergeant")]
    BandSergeant,
    #[serde(rename = "Worship Sergeant")]
    WorshipSergeant,
    #[serde(rename = "Logistic Sergeant")]
    LogisticSergeant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platoon {
    A,
    B,
    C,
    D,
}

impl Platoon {
    /// Squads 1–2 form platoon A, 3–4 B, 5–6 C and 7–8 D.
    pub fn for_squad(squad: u8) -> Option<Self> {
        match squad {
            1 | 2 => Some(Platoon::A),
            3 | 4 => Some(Platoon::B),
            5 | 6 => Some(Platoon::C),
            7 | 8 => Some(Platoon::D),
            _ => None,
        }
    }
}

/// Member record as stored under `users/{id}`.
///
/// Reading is lenient: a field with an unexpected shape reads as absent instead of
/// making the whole profile unreadable. Enrolment goes through [`NewMember::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    #[serde(default, alias = "roles", deserialize_with = "lenient")]
    pub role: Role,
    #[serde(
        default,
        deserialize_with = "stored_squad",
        serialize_with = "squad_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub squad: Option<u8>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub platoon: Option<Platoon>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year_joined: String,
    #[serde(default, deserialize_with = "held_badges")]
    pub badges: Vec<HeldBadge>,
}

impl Member {
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        self.dob.map(|dob| age_on(dob, today))
    }

    /// Label used by attendance records, e.g. `Squad 3`.
    pub fn squad_name(&self) -> Option<String> {
        self.squad.map(|squad| format!("Squad {squad}"))
    }

    pub fn rank_label(&self) -> &'static str {
        self.rank.map(Rank::label).unwrap_or("No rank")
    }
}

/// Completed years between `dob` and `today`.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Form input for enrolling a member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub rank: Option<Rank>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, deserialize_with = "squad_input")]
    pub squad: Option<u8>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year_joined: String,
    #[serde(default)]
    pub badges: Vec<HeldBadge>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemberValidationError {
    #[error("Name, DOB, and Rank are required!")]
    MissingRequired,
    #[error("Member must be at least 13 years old (currently {0}).")]
    TooYoung(i32),
    #[error("Year joined must be a four-digit year between 1900 and {current}.")]
    InvalidYearJoined { current: i32 },
    #[error("Squad must be between 1 and 8.")]
    InvalidSquad(u8),
}

impl NewMember {
    /// Validate against `today` and build the stored record with a fresh id.
    pub fn validate(self, today: NaiveDate) -> Result<Member, MemberValidationError> {
        let name = self.name.trim().to_string();
        let (Some(dob), Some(rank)) = (self.dob, self.rank) else {
            return Err(MemberValidationError::MissingRequired);
        };
        if name.is_empty() {
            return Err(MemberValidationError::MissingRequired);
        }

        let age = age_on(dob, today);
        if age < MINIMUM_AGE {
            return Err(MemberValidationError::TooYoung(age));
        }

        let year_joined = self.year_joined.trim().to_string();
        if !is_valid_joining_year(&year_joined, today.year()) {
            return Err(MemberValidationError::InvalidYearJoined {
                current: today.year(),
            });
        }

        let platoon = match self.squad {
            Some(squad) => Some(
                Platoon::for_squad(squad).ok_or(MemberValidationError::InvalidSquad(squad))?,
            ),
            None => None,
        };

        Ok(Member {
            id: Uuid::new_v4().to_string(),
            name,
            dob: Some(dob),
            rank: Some(rank),
            role: self.role,
            squad: self.squad,
            platoon,
            year_joined,
            badges: self.badges,
        })
    }
}

fn is_valid_joining_year(raw: &str, current_year: i32) -> bool {
    raw.len() == 4
        && raw.chars().all(|ch| ch.is_ascii_digit())
        && raw
            .parse::<i32>()
            .is_ok_and(|year| (EARLIEST_JOINING_YEAR..=current_year).contains(&year))
}

/// Any value that does not fit `T` reads as `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

fn squad_number(value: &Value) -> Option<u8> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

/// Squads are kept as strings (`"3"`); older records hold numbers.
fn stored_squad<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(squad_number(&Value::deserialize(deserializer)?))
}

fn squad_input<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(raw) if raw.trim().is_empty() => Ok(None),
        value => squad_number(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("squad must be a number, got {value}"))),
    }
}

fn squad_as_string<S>(squad: &Option<u8>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match squad {
        Some(number) => serializer.collect_str(number),
        None => serializer.serialize_none(),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => raw,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

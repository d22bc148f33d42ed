// 🐺 Wolf Entity - wire record + validated value
//
// WolfRecord is what clients send and receive (raw strings, integer codes).
// Wolf is what the store accepts: every field already parsed and checked.
// The only way from one to the other is validate::check().

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validate::{self, ValidationError};

// ============================================================================
// WIRE RECORD
// ============================================================================

/// Wolf as it appears on the wire and in CSV imports.
///
/// Missing fields deserialize to their defaults so that an incomplete payload
/// is reported as a validation failure instead of a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WolfRecord {
    /// Store-assigned identity. Ignored on create.
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,

    /// Invariant-grammar date, e.g. "2019-04-30" or "04/30/2019"
    #[serde(default)]
    pub birth_date: String,

    /// ISO/IEC 5218 code plus 3 for non-binary
    #[serde(default)]
    pub gender: i32,

    /// "lat/lon" or "lat/lon/elevation"
    #[serde(default)]
    pub location: String,

    /// Concurrency token. Omit on replace to overwrite unconditionally.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

// ============================================================================
// GENDER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    NotKnown,
    Male,
    Female,
    NonBinary,
    NotApplicable,
}

impl Gender {
    pub const ALL: [Gender; 5] = [
        Gender::NotKnown,
        Gender::Male,
        Gender::Female,
        Gender::NonBinary,
        Gender::NotApplicable,
    ];

    /// Integer code used on the wire and in the database
    pub fn code(self) -> i32 {
        match self {
            Gender::NotKnown => 0,
            Gender::Male => 1,
            Gender::Female => 2,
            Gender::NonBinary => 3,
            Gender::NotApplicable => 9,
        }
    }

    pub fn from_code(code: i32) -> Option<Gender> {
        match code {
            0 => Some(Gender::NotKnown),
            1 => Some(Gender::Male),
            2 => Some(Gender::Female),
            3 => Some(Gender::NonBinary),
            9 => Some(Gender::NotApplicable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::NotKnown => "Not known",
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::NonBinary => "Non binary",
            Gender::NotApplicable => "Not applicable",
        }
    }
}

impl TryFrom<i32> for Gender {
    type Error = ValidationError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        validate::check_gender(code)
    }
}

// ============================================================================
// LOCATION
// ============================================================================

/// Geographic position. Latitude and longitude are range-checked on parse;
/// elevation is not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

impl FromStr for Location {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate::check_location(s)
    }
}

/// Always emits all three fields, so "45/-93" is stored as "45/-93/0".
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.latitude, self.longitude, self.elevation)
    }
}

// ============================================================================
// BIRTH DATE
// ============================================================================

/// Calendar date, optionally with a time of day (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirthDate {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl BirthDate {
    /// The instant this birth date denotes. Date-only values start at midnight.
    pub fn instant(&self) -> NaiveDateTime {
        match self {
            BirthDate::Date(date) => date.and_time(chrono::NaiveTime::MIN),
            BirthDate::DateTime(datetime) => *datetime,
        }
    }
}

impl FromStr for BirthDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate::parse_birth_date(s)
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BirthDate::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            BirthDate::DateTime(datetime) => {
                write!(f, "{}", datetime.format("%Y-%m-%dT%H:%M:%S%.f"))
            }
        }
    }
}

// ============================================================================
// VALIDATED WOLF
// ============================================================================

/// A wolf that passed validation (or was read back from the store).
#[derive(Debug, Clone, PartialEq)]
pub struct Wolf {
    pub id: i64,
    pub name: String,
    pub birth_date: BirthDate,
    pub gender: Gender,
    pub location: Location,
    pub version: Option<i64>,
}

impl Wolf {
    pub fn to_record(&self) -> WolfRecord {
        WolfRecord {
            id: self.id,
            name: self.name.clone(),
            birth_date: self.birth_date.to_string(),
            gender: self.gender.code(),
            location: self.location.to_string(),
            version: self.version,
        }
    }
}

impl From<Wolf> for WolfRecord {
    fn from(wolf: Wolf) -> Self {
        wolf.to_record()
    }
}

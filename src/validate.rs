// ✅ Wolf Validator
// Decides whether a candidate record is well-formed enough to persist.
//
// Checks run in a fixed order and stop at the first failure:
// 1. Birth date: parseable and not after `now`
// 2. Gender: one of 0, 1, 2, 3, 9
// 3. Location: 2 or 3 numeric fields, latitude/longitude in range
//
// Everything here is pure. The caller supplies `now`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::wolf::{BirthDate, Gender, Location, Wolf, WolfRecord};

pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

const LOCATION_SEPARATOR: char = '/';
const MIN_LOCATION_FIELDS: usize = 2;
const MAX_LOCATION_FIELDS: usize = 3;

/// Date-only formats, tried in order
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Date-time formats without offset, tried in order (read as UTC)
/// `%.f` also matches an empty fraction.
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("birth date `{0}` is not a valid date")]
    UnparseableDate(String),

    #[error("birth date `{0}` is in the future")]
    FutureDate(String),

    #[error("gender code {0} is not one of 0, 1, 2, 3, 9")]
    UnknownGender(i32),

    #[error("location `{location}` must have 2 or 3 `/`-separated fields, found {fields}")]
    LocationFieldCount { location: String, fields: usize },

    #[error("location field `{0}` is not a number")]
    UnparseableCoordinate(String),

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl ValidationError {
    /// Wire name of the field that failed
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::UnparseableDate(_) | ValidationError::FutureDate(_) => "birthDate",
            ValidationError::UnknownGender(_) => "gender",
            ValidationError::LocationFieldCount { .. }
            | ValidationError::UnparseableCoordinate(_)
            | ValidationError::LatitudeOutOfRange(_)
            | ValidationError::LongitudeOutOfRange(_) => "location",
        }
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Accept/reject form of [`check`].
pub fn validate(record: &WolfRecord, now: NaiveDateTime) -> bool {
    check(record, now).is_ok()
}

/// Validate `record` against `now` and return its parsed form.
pub fn check(record: &WolfRecord, now: NaiveDateTime) -> Result<Wolf, ValidationError> {
    let birth_date = check_birth_date(&record.birth_date, now)?;
    let gender = check_gender(record.gender)?;
    let location = check_location(&record.location)?;

    Ok(Wolf {
        id: record.id,
        name: record.name.clone(),
        birth_date,
        gender,
        location,
        version: record.version,
    })
}

// ============================================================================
// DATE CHECK
// ============================================================================

/// Parse a birth date without the "not in the future" rule.
pub fn parse_birth_date(input: &str) -> Result<BirthDate, ValidationError> {
    let trimmed = input.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(BirthDate::Date(date));
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(BirthDate::DateTime(datetime));
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(BirthDate::DateTime(datetime.with_timezone(&Utc).naive_utc()));
    }

    Err(ValidationError::UnparseableDate(input.to_string()))
}

/// Boundary is inclusive: a birth date equal to `now` is accepted.
pub fn check_birth_date(input: &str, now: NaiveDateTime) -> Result<BirthDate, ValidationError> {
    let birth_date = parse_birth_date(input)?;

    if birth_date.instant() > now {
        return Err(ValidationError::FutureDate(input.to_string()));
    }

    Ok(birth_date)
}

// ============================================================================
// GENDER CHECK
// ============================================================================

pub fn check_gender(code: i32) -> Result<Gender, ValidationError> {
    Gender::from_code(code).ok_or(ValidationError::UnknownGender(code))
}

// ============================================================================
// LOCATION CHECK
// ============================================================================

/// Parse and range-check "lat/lon[/elevation]".
pub fn check_location(input: &str) -> Result<Location, ValidationError> {
    let fields: Vec<&str> = input.split(LOCATION_SEPARATOR).collect();

    if fields.len() < MIN_LOCATION_FIELDS || fields.len() > MAX_LOCATION_FIELDS {
        return Err(ValidationError::LocationFieldCount {
            location: input.to_string(),
            fields: fields.len(),
        });
    }

    let mut values = [0.0_f64; MAX_LOCATION_FIELDS];
    for (slot, field) in values.iter_mut().zip(&fields) {
        *slot = parse_coordinate(field)?;
    }
    let [latitude, longitude, elevation] = values;

    if !LATITUDE_RANGE.contains(&latitude) {
        return Err(ValidationError::LatitudeOutOfRange(latitude));
    }

    if !LONGITUDE_RANGE.contains(&longitude) {
        return Err(ValidationError::LongitudeOutOfRange(longitude));
    }

    Ok(Location {
        latitude,
        longitude,
        elevation,
    })
}

/// `f64::from_str` is locale-independent: optional sign, `.` decimal point,
/// exponent, no thousands separators. It also accepts "inf" and "NaN",
/// which are not positions.
fn parse_coordinate(field: &str) -> Result<f64, ValidationError> {
    match field.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::UnparseableCoordinate(field.to_string())),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    fn create_test_record() -> WolfRecord {
        WolfRecord {
            id: 1,
            name: "Akela".to_string(),
            birth_date: "2019-04-30".to_string(),
            gender: 1,
            location: "45.0/-93.0/250".to_string(),
            version: None,
        }
    }

    #[test]
    fn test_valid_record_is_accepted() {
        let record = create_test_record();
        assert!(validate(&record, now()));

        let wolf = check(&record, now()).unwrap();
        assert_eq!(wolf.gender, Gender::Male);
        assert_eq!(wolf.location.elevation, 250.0);
        assert_eq!(wolf.name, "Akela");
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut record = create_test_record();
        assert_eq!(check(&record, now()), check(&record, now()));

        record.location = "91/0".to_string();
        assert_eq!(validate(&record, now()), validate(&record, now()));
    }

    // ------------------------------------------------------------------------
    // Date
    // ------------------------------------------------------------------------

    #[test]
    fn test_date_grammar() {
        for input in [
            "2019-04-30",
            "04/30/2019",
            "4/30/2019",
            " 2019-04-30 ",
            "2019-04-30T06:15:00",
            "2019-04-30T06:15:00.250",
            "2019-04-30 06:15:00",
            "04/30/2019 06:15:00",
            "2019-04-30T06:15:00+02:00",
            "2019-04-30T06:15:00Z",
        ] {
            assert!(parse_birth_date(input).is_ok(), "should parse {input:?}");
        }

        for input in ["", "yesterday", "30.04.2019", "2019-13-01", "2019-02-30", "04/30/19x"] {
            assert_eq!(
                parse_birth_date(input),
                Err(ValidationError::UnparseableDate(input.to_string())),
                "should reject {input:?}"
            );
        }
    }

    #[test]
    fn test_fraction_is_optional_in_iso_datetime() {
        let whole = NaiveDate::from_ymd_opt(2019, 4, 30)
            .unwrap()
            .and_hms_opt(6, 15, 0)
            .unwrap();
        assert_eq!(
            parse_birth_date("2019-04-30T06:15:00"),
            Ok(BirthDate::DateTime(whole))
        );
        assert_eq!(
            parse_birth_date("2019-04-30T06:15:00.250"),
            Ok(BirthDate::DateTime(whole + Duration::milliseconds(250)))
        );
    }

    #[test]
    fn test_rfc3339_offset_is_normalized_to_utc() {
        let parsed = parse_birth_date("2019-04-30T01:00:00+02:00").unwrap();
        assert_eq!(parsed.to_string(), "2019-04-29T23:00:00");
    }

    #[test]
    fn test_birth_date_today_is_accepted() {
        let today = now().date().format("%Y-%m-%d").to_string();
        assert!(check_birth_date(&today, now()).is_ok());

        let exactly_now = now().format("%Y-%m-%dT%H:%M:%S").to_string();
        assert!(check_birth_date(&exactly_now, now()).is_ok());
    }

    #[test]
    fn test_birth_date_in_future_is_rejected() {
        let tomorrow = (now().date() + Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();
        assert_eq!(
            check_birth_date(&tomorrow, now()),
            Err(ValidationError::FutureDate(tomorrow.clone()))
        );

        let one_second_later = (now() + Duration::seconds(1))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        assert!(check_birth_date(&one_second_later, now()).is_err());
    }

    #[test]
    fn test_scenario_e_tomorrow_rejected() {
        let mut record = create_test_record();
        record.birth_date = (now().date() + Duration::days(1))
            .format("%m/%d/%Y")
            .to_string();

        assert!(!validate(&record, now()));
    }

    // ------------------------------------------------------------------------
    // Gender
    // ------------------------------------------------------------------------

    #[test]
    fn test_gender_closed_set() {
        for code in [0, 1, 2, 3, 9] {
            assert!(check_gender(code).is_ok(), "code {code} should pass");
        }
        for code in [-1, 4, 5, 7, 8, 10, i32::MAX, i32::MIN] {
            assert_eq!(check_gender(code), Err(ValidationError::UnknownGender(code)));
        }
    }

    #[test]
    fn test_scenario_d_gender_seven_rejected() {
        let mut record = create_test_record();
        record.gender = 7;

        assert!(!validate(&record, now()));
        assert_eq!(check(&record, now()).unwrap_err().field(), "gender");
    }

    // ------------------------------------------------------------------------
    // Location
    // ------------------------------------------------------------------------

    #[test]
    fn test_scenario_a_two_fields_default_elevation() {
        let location = check_location("45.0/-93.0").unwrap();
        assert_eq!(location.latitude, 45.0);
        assert_eq!(location.longitude, -93.0);
        assert_eq!(location.elevation, 0.0);
    }

    #[test]
    fn test_scenario_b_latitude_out_of_range() {
        assert_eq!(
            check_location("91.0/0.0"),
            Err(ValidationError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            check_location("-90.5/0.0"),
            Err(ValidationError::LatitudeOutOfRange(-90.5))
        );
    }

    #[test]
    fn test_scenario_c_too_many_fields() {
        assert_eq!(
            check_location("45.0/-93.0/100/5"),
            Err(ValidationError::LocationFieldCount {
                location: "45.0/-93.0/100/5".to_string(),
                fields: 4,
            })
        );
    }

    #[test]
    fn test_too_few_fields() {
        assert!(matches!(
            check_location("45.0"),
            Err(ValidationError::LocationFieldCount { fields: 1, .. })
        ));
        assert!(matches!(
            check_location(""),
            Err(ValidationError::LocationFieldCount { fields: 1, .. })
        ));
    }

    #[test]
    fn test_longitude_bounds() {
        assert!(check_location("0/180").is_ok());
        assert!(check_location("0/-180").is_ok());
        assert_eq!(
            check_location("0/180.0001"),
            Err(ValidationError::LongitudeOutOfRange(180.0001))
        );
    }

    #[test]
    fn test_latitude_bounds_are_inclusive() {
        assert!(check_location("90/0").is_ok());
        assert!(check_location("-90/0").is_ok());
    }

    #[test]
    fn test_elevation_is_unconstrained() {
        assert_eq!(check_location("0/0/-11034").unwrap().elevation, -11034.0);
        assert_eq!(check_location("0/0/1e6").unwrap().elevation, 1_000_000.0);
    }

    #[test]
    fn test_invariant_number_grammar() {
        assert!(check_location("+45.5/-9.3e1").is_ok());
        assert!(check_location(" 45.5 / -93 ").is_ok());
        assert!(check_location(".5/-.5").is_ok());

        for input in ["45,5/-93", "1,000/0", "45/abc", "45//0", "45/-93/", "NaN/0", "0/inf", "0/0/infinity"] {
            assert!(
                matches!(
                    check_location(input),
                    Err(ValidationError::UnparseableCoordinate(_))
                        | Err(ValidationError::LocationFieldCount { .. })
                ),
                "should reject {input:?}"
            );
        }
    }

    #[test]
    fn test_first_unparseable_field_is_reported() {
        assert_eq!(
            check_location("north/west"),
            Err(ValidationError::UnparseableCoordinate("north".to_string()))
        );
    }

    // ------------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------------

    #[test]
    fn test_checks_short_circuit_in_order() {
        let record = WolfRecord {
            birth_date: "not a date".to_string(),
            gender: 42,
            location: "999/999".to_string(),
            ..create_test_record()
        };
        assert_eq!(check(&record, now()).unwrap_err().field(), "birthDate");

        let record = WolfRecord {
            birth_date: "2019-04-30".to_string(),
            ..record
        };
        assert_eq!(check(&record, now()).unwrap_err().field(), "gender");

        let record = WolfRecord { gender: 2, ..record };
        assert_eq!(check(&record, now()).unwrap_err().field(), "location");
    }
}

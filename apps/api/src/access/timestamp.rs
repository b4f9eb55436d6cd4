//! Normalization of the persisted `subscription_end` field.
//!
//! Three writers have touched the `users` collection over time, each storing
//! the expiry differently:
//!
//! - a native BSON datetime (or the internal BSON timestamp type),
//! - a serialized document `{ "_seconds": <unix>, "_nanoseconds": <n> }`,
//! - an ISO-8601 string.
//!
//! Everything else is rejected with [`TimestampError`] instead of being read
//! as "no subscription".

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use mongodb::bson::{Bson, Document};
use thiserror::Error;

const SECONDS_FIELD: &str = "_seconds";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("unsupported subscription_end representation: {0}")]
    UnsupportedShape(String),

    #[error("subscription_end is not a valid ISO-8601 datetime: '{0}'")]
    InvalidIsoString(String),

    #[error("subscription_end is outside the representable range: {0}")]
    OutOfRange(String),
}

/// Converts a stored `subscription_end` into a UTC instant.
///
/// Returns `Ok(None)` when the field is absent, null or an empty string.
pub fn normalize_subscription_end(
    value: Option<&Bson>,
) -> Result<Option<DateTime<Utc>>, TimestampError> {
    let value = match value {
        None | Some(Bson::Null) => return Ok(None),
        Some(value) => value,
    };

    let instant = match value {
        Bson::DateTime(dt) => from_millis(dt.timestamp_millis())?,
        Bson::Timestamp(ts) => from_seconds(i64::from(ts.time))?,
        Bson::Document(doc) if doc.contains_key(SECONDS_FIELD) => from_seconds_field(doc)?,
        Bson::String(s) if s.trim().is_empty() => return Ok(None),
        Bson::String(s) => parse_iso8601(s)?,
        other => {
            return Err(TimestampError::UnsupportedShape(format!(
                "{:?}",
                other.element_type()
            )))
        }
    };

    Ok(Some(instant))
}

/// Writes an instant back in the native store representation.
pub fn to_bson(instant: DateTime<Utc>) -> Bson {
    Bson::DateTime(mongodb::bson::DateTime::from_millis(
        instant.timestamp_millis(),
    ))
}

fn from_seconds_field(doc: &Document) -> Result<DateTime<Utc>, TimestampError> {
    match doc.get(SECONDS_FIELD) {
        Some(Bson::Int32(seconds)) => from_seconds(i64::from(*seconds)),
        Some(Bson::Int64(seconds)) => from_seconds(*seconds),
        Some(Bson::Double(seconds)) if seconds.is_finite() => {
            from_millis((seconds * 1000.0).round() as i64)
        }
        Some(other) => Err(TimestampError::UnsupportedShape(format!(
            "{SECONDS_FIELD} of type {:?}",
            other.element_type()
        ))),
        None => Err(TimestampError::UnsupportedShape(format!(
            "document without {SECONDS_FIELD}"
        ))),
    }
}

fn from_seconds(seconds: i64) -> Result<DateTime<Utc>, TimestampError> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| TimestampError::OutOfRange(format!("{seconds}s")))
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, TimestampError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| TimestampError::OutOfRange(format!("{millis}ms")))
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];
const DATE_TIME_SEPARATORS: [&str; 2] = ["T", " "];
// Longest first: `%H:%M` would otherwise stop short of the seconds.
const TIME_FORMATS: [&str; 4] = ["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"];
const OFFSET_FORMATS: [&str; 2] = ["%:z", "%z"];

/// Accepts the ISO-8601 extended and basic forms: optional seconds and
/// fraction, `T` or space separator, `Z`, `±HH:MM` or `±HHMM` offsets, and a
/// bare date (midnight). Offset-less values are read as UTC.
fn parse_iso8601(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let s = match s.strip_suffix(|c: char| c.eq_ignore_ascii_case(&'z')) {
        Some(rest) => format!("{rest}+00:00"),
        None => s.to_string(),
    };

    for date in DATE_FORMATS {
        for separator in DATE_TIME_SEPARATORS {
            for time in TIME_FORMATS {
                let local_format = format!("{date}{separator}{time}");
                for offset in OFFSET_FORMATS {
                    let format = format!("{local_format}{offset}");
                    if let Ok(dt) = DateTime::parse_from_str(&s, &format) {
                        return Ok(dt.with_timezone(&Utc));
                    }
                }
                if let Ok(naive) = NaiveDateTime::parse_from_str(&s, &local_format) {
                    return Ok(Utc.from_utc_datetime(&naive));
                }
            }
        }

        let midnight = NaiveDate::parse_from_str(&s, date)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0));
        if let Some(midnight) = midnight {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    Err(TimestampError::InvalidIsoString(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, Timestamp};

    #[test]
    fn test_absent_and_null_mean_no_subscription() {
        assert_eq!(normalize_subscription_end(None), Ok(None));
        assert_eq!(normalize_subscription_end(Some(&Bson::Null)), Ok(None));
        assert_eq!(
            normalize_subscription_end(Some(&Bson::String(String::new()))),
            Ok(None)
        );
    }

    #[test]
    fn test_seconds_zero_is_unix_epoch() {
        let value = Bson::Document(doc! { "_seconds": 0, "_nanoseconds": 0 });
        let instant = normalize_subscription_end(Some(&value)).unwrap().unwrap();
        assert_eq!(instant, Utc.timestamp_opt(0, 0).unwrap());
    }

    #[test]
    fn test_seconds_field_accepts_int64_and_double() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let secs = expected.timestamp();

        let as_i64 = Bson::Document(doc! { "_seconds": secs });
        assert_eq!(
            normalize_subscription_end(Some(&as_i64)).unwrap(),
            Some(expected)
        );

        let as_f64 = Bson::Document(doc! { "_seconds": secs as f64 });
        assert_eq!(
            normalize_subscription_end(Some(&as_f64)).unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn test_iso_string_parses_to_exact_instant() {
        let value = Bson::String("2025-06-15T08:30:00+02:00".to_string());
        let instant = normalize_subscription_end(Some(&value)).unwrap().unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 6, 15, 6, 30, 0).unwrap());
    }

    #[test]
    fn test_iso_string_with_fraction_and_space_separator() {
        let value = Bson::String("2025-06-15 08:30:00.250000+00:00".to_string());
        let instant = normalize_subscription_end(Some(&value)).unwrap().unwrap();
        assert_eq!(instant.timestamp_millis() % 1000, 250);
        let whole_seconds = Utc.with_ymd_and_hms(2025, 6, 15, 8, 30, 0).unwrap();
        assert_eq!(instant.timestamp(), whole_seconds.timestamp());
    }

    #[test]
    fn test_offsetless_iso_string_is_read_as_utc() {
        let value = Bson::String("2030-01-01T00:00:00".to_string());
        let instant = normalize_subscription_end(Some(&value)).unwrap().unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_native_datetime_round_trips_through_to_bson() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let stored = to_bson(expected);
        assert_eq!(
            normalize_subscription_end(Some(&stored)).unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn test_bson_timestamp_uses_its_seconds() {
        let value = Bson::Timestamp(Timestamp {
            time: 86_400,
            increment: 1,
        });
        let instant = normalize_subscription_end(Some(&value)).unwrap().unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_iso_forms_without_seconds_or_with_compact_offsets() {
        let expected = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        for raw in [
            "2030-01-01T00:00Z",
            "2030-01-01T00:00:00+0000",
            "2030-01-01T02:00+02:00",
            "2030-01-01T02:00:00+0200",
            "2030-01-01 00:00",
            "2030-01-01",
        ] {
            let value = Bson::String(raw.to_string());
            assert_eq!(
                normalize_subscription_end(Some(&value)),
                Ok(Some(expected)),
                "failed to parse {raw}"
            );
        }
    }

    #[test]
    fn test_iso_basic_format() {
        let expected = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        for raw in [
            "20300101T000000Z",
            "20300101T000000",
            "20300101T0100+0100",
            "20300101T000000.000+00:00",
            "20300101",
        ] {
            let value = Bson::String(raw.to_string());
            assert_eq!(
                normalize_subscription_end(Some(&value)),
                Ok(Some(expected)),
                "failed to parse {raw}"
            );
        }
    }

    #[test]
    fn test_malformed_string_is_an_error() {
        let value = Bson::String("next tuesday".to_string());
        assert_eq!(
            normalize_subscription_end(Some(&value)),
            Err(TimestampError::InvalidIsoString("next tuesday".to_string()))
        );
    }

    #[test]
    fn test_unrecognized_shapes_are_errors() {
        for value in [
            Bson::Int64(1_700_000_000),
            Bson::Boolean(true),
            Bson::Document(doc! { "seconds": 10 }),
            Bson::Document(doc! { "_seconds": "10" }),
        ] {
            assert!(
                matches!(
                    normalize_subscription_end(Some(&value)),
                    Err(TimestampError::UnsupportedShape(_))
                ),
                "expected {value:?} to be rejected"
            );
        }
    }
}

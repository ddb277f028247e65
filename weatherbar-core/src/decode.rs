//! Scalar decoders for the provider's loosely typed wire format.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

const HOUR_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DAY_FORMAT: &str = "%Y-%m-%d";

// `D` marks a digit; every other byte must match literally.
const HOUR_SHAPE: &[u8] = b"DDDD-DD-DDTDD:DD";
const DAY_SHAPE: &[u8] = b"DDDD-DD-DD";

/// A `YYYY-MM-DDTHH:MM` wall-clock time, without seconds or offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourStamp(pub NaiveDateTime);

impl<'de> Deserialize<'de> for HourStamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        exact_shape(&s, HOUR_SHAPE)
            .and_then(|s| NaiveDateTime::parse_from_str(s, HOUR_FORMAT).ok())
            .map(HourStamp)
            .ok_or_else(|| de::Error::custom(format!("invalid hour timestamp '{s}'")))
    }
}

/// A `YYYY-MM-DD` calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStamp(pub NaiveDate);

impl<'de> Deserialize<'de> for DayStamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        exact_shape(&s, DAY_SHAPE)
            .and_then(|s| NaiveDate::parse_from_str(s, DAY_FORMAT).ok())
            .map(DayStamp)
            .ok_or_else(|| de::Error::custom(format!("invalid date '{s}'")))
    }
}

// chrono tolerates padding, signs and single-digit fields; the wire format does not.
fn exact_shape<'a>(s: &'a str, shape: &[u8]) -> Option<&'a str> {
    let matches = s.len() == shape.len()
        && s.bytes().zip(shape).all(|(b, &p)| match p {
            b'D' => b.is_ascii_digit(),
            lit => b == lit,
        });
    matches.then_some(s)
}

/// A boolean the provider encodes as a number: `0` is false, anything else true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag(pub bool);

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }
}

struct FlagVisitor;

impl Visitor<'_> for FlagVisitor {
    type Value = Flag;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 0/1 numeral")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Flag, E> {
        Ok(Flag(v != 0))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Flag, E> {
        Ok(Flag(v != 0))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Flag, E> {
        Ok(Flag(v != 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn hour(json: &str) -> Result<HourStamp, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn hour_stamp_accepts_exact_shape() {
        let HourStamp(t) = hour("\"2024-01-15T10:45\"").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second(), t.nanosecond()), (10, 45, 0, 0));
    }

    #[test]
    fn hour_stamp_rejects_other_shapes() {
        for bad in [
            "\"2024-01-15T10:45:00\"",
            "\"2024-01-15T10:45Z\"",
            "\"2024-01-15\"",
            "\"2024-1-5T1:05\"",
            "\"2024-13-15T10:45\"",
            "\"2024-01-15T 9:45\"",
            "\"+024-01-15T10:45\"",
            "\"2024-01-15T10: 5\"",
            "\"2024-01-15 10:45\"",
            "null",
            "1705312800",
        ] {
            assert!(hour(bad).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn day_stamp_parses_dates_only() {
        let DayStamp(d) = serde_json::from_str("\"2024-02-29\"").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(serde_json::from_str::<DayStamp>("\"2023-02-29\"").is_err());
        assert!(serde_json::from_str::<DayStamp>("\"2024-02-29T00:00\"").is_err());
        for bad in ["\"2024-01- 5\"", "\"+024-01-05\"", "\"2024/01/05\""] {
            assert!(serde_json::from_str::<DayStamp>(bad).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn flag_decodes_numerals() {
        let flags: Vec<Flag> = serde_json::from_str("[0, 1, 2, -1]").unwrap();
        assert_eq!(flags, vec![Flag(false), Flag(true), Flag(true), Flag(true)]);
    }

    #[test]
    fn flag_rejects_non_numerals() {
        for bad in ["true", "null", "\"1\"", ""] {
            assert!(serde_json::from_str::<Flag>(bad).is_err(), "accepted {bad}");
        }
    }
}

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, Timelike};
use serde::{Serialize, Serializer};

/// Rendered in place of a measurement the provider never populated.
pub const UNSUPPORTED: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A scalar that is either populated by the provider or was never set.
///
/// Unlike a plain number this keeps "not reported" apart from a real zero:
/// an unset measure displays and serializes as [`UNSUPPORTED`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measure<T>(Option<T>);

impl<T: Copy> Measure<T> {
    pub fn set(value: T) -> Self {
        Self(Some(value))
    }

    pub fn unset() -> Self {
        Self(None)
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<T> {
        self.0
    }

    pub fn map<U: Copy>(self, f: impl FnOnce(T) -> U) -> Measure<U> {
        Measure(self.0.map(f))
    }
}

impl<T> From<Option<T>> for Measure<T> {
    fn from(value: Option<T>) -> Self {
        Self(value)
    }
}

impl<T: fmt::Display> fmt::Display for Measure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(v) => v.fmt(f),
            None => f.write_str(UNSUPPORTED),
        }
    }
}

impl<T: Serialize> Serialize for Measure<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_str(UNSUPPORTED),
        }
    }
}

/// Display unit strings as echoed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Units {
    pub temperature: String,
    pub wind_speed: String,
    pub humidity: String,
    pub pressure: String,
    pub wind_direction: String,
}

/// One weather reading, either current conditions or a single forecast hour.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Instant {
    pub time: DateTime<FixedOffset>,
    pub temperature: Measure<f64>,
    pub apparent_temperature: Measure<f64>,
    pub weather_code: Measure<i32>,
    pub wind_speed: Measure<f64>,
    pub wind_gusts: Measure<f64>,
    /// Degrees, 0–360.
    pub wind_direction: Measure<f64>,
    pub humidity: Measure<f64>,
    /// Forecast hours only.
    pub precipitation_probability: Measure<f64>,
    pub pressure: Measure<f64>,
    pub is_day: Measure<bool>,
    pub units: Units,
}

/// Hour-granularity key: a timestamp floored to the start of its clock hour.
///
/// Flooring happens on the wall clock of the timestamp's own offset, so two
/// readings taken in the same local hour share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayHour(DateTime<FixedOffset>);

impl DayHour {
    pub fn new(t: DateTime<FixedOffset>) -> Self {
        let sub_hour = TimeDelta::seconds(i64::from(t.minute() * 60 + t.second()))
            + TimeDelta::nanoseconds(i64::from(t.nanosecond()));
        Self(t - sub_hour)
    }

    pub fn to_time(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

impl From<DateTime<FixedOffset>> for DayHour {
    fn from(t: DateTime<FixedOffset>) -> Self {
        Self::new(t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    /// Local midnight of the day these times belong to.
    pub day: DateTime<FixedOffset>,
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
}

/// Everything a single fetch produced.
#[derive(Debug, Clone, Default)]
pub struct WeatherData {
    pub generated_at: DateTime<FixedOffset>,
    pub coordinates: Coordinates,
    pub current: Instant,
    /// Keys are unique but unordered; sort before display.
    pub forecast: HashMap<DayHour, Instant>,
    pub daily: BTreeMap<NaiveDate, SunTimes>,
}

impl WeatherData {
    pub fn sun_times(&self, date: NaiveDate) -> Option<SunTimes> {
        self.daily.get(&date).copied()
    }
}

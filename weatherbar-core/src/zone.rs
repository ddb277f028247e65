//! Local reference timezone.
//!
//! The provider is asked to report times in the same zone we later use to
//! interpret its naive `YYYY-MM-DDTHH:MM` strings.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceZone {
    Utc,
    Named(Tz),
    /// The system zone could not be named; the provider picks one (`auto`).
    #[default]
    Local,
}

impl ReferenceZone {
    /// Resolve the zone of the running system.
    pub fn detect() -> Self {
        match iana_time_zone::get_timezone() {
            Ok(name) => Self::from_name(&name),
            Err(e) => {
                tracing::debug!("could not resolve system timezone: {e}");
                ReferenceZone::Local
            }
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "UTC" | "Etc/UTC" | "UCT" | "Etc/UCT" | "Universal" | "Etc/Universal" | "Zulu"
            | "Etc/Zulu" => ReferenceZone::Utc,
            "" | "Local" => ReferenceZone::Local,
            other => match other.parse::<Tz>() {
                Ok(tz) => ReferenceZone::Named(tz),
                Err(_) => {
                    tracing::debug!("unknown timezone name '{other}', falling back to local");
                    ReferenceZone::Local
                }
            },
        }
    }

    /// Value for the provider's `timezone` query parameter.
    pub fn query_param(&self) -> Cow<'static, str> {
        match self {
            ReferenceZone::Utc => Cow::Borrowed("GMT"),
            ReferenceZone::Local => Cow::Borrowed("auto"),
            ReferenceZone::Named(tz) => Cow::Owned(tz.name().to_string()),
        }
    }

    /// Interpret a wall-clock time as being expressed in this zone.
    pub fn localize(&self, naive: NaiveDateTime) -> DateTime<FixedOffset> {
        match self {
            ReferenceZone::Utc => resolve(&Utc, naive),
            ReferenceZone::Named(tz) => resolve(tz, naive),
            ReferenceZone::Local => resolve(&Local, naive),
        }
    }

    pub fn midnight(&self, date: NaiveDate) -> DateTime<FixedOffset> {
        self.localize(date.and_time(chrono::NaiveTime::MIN))
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        let now = Utc::now();
        match self {
            ReferenceZone::Utc => now.fixed_offset(),
            ReferenceZone::Named(tz) => now.with_timezone(tz).fixed_offset(),
            ReferenceZone::Local => now.with_timezone(&Local).fixed_offset(),
        }
    }
}

// Ambiguous times pick the earlier instant; times inside a DST gap move
// forward by the gap.
fn resolve<Z: TimeZone>(zone: &Z, naive: NaiveDateTime) -> DateTime<FixedOffset> {
    if let Some(t) = zone.from_local_datetime(&naive).earliest() {
        return t.fixed_offset();
    }
    zone.from_local_datetime(&(naive + TimeDelta::hours(1)))
        .earliest()
        .map(|t| t.fixed_offset())
        .unwrap_or_else(|| naive.and_utc().fixed_offset())
}

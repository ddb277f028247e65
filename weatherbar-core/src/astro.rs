//! Moon phase from the mean synodic month.

use chrono::{DateTime, TimeZone, Utc};

const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    const ALL: [MoonPhase; 8] = [
        MoonPhase::NewMoon,
        MoonPhase::WaxingCrescent,
        MoonPhase::FirstQuarter,
        MoonPhase::WaxingGibbous,
        MoonPhase::FullMoon,
        MoonPhase::WaningGibbous,
        MoonPhase::LastQuarter,
        MoonPhase::WaningCrescent,
    ];

    pub fn at<Tz: TimeZone>(t: &DateTime<Tz>) -> Self {
        let age = lunar_age_days(t.with_timezone(&Utc));
        // Eight equal buckets, each centred on its principal phase.
        let bucket = ((age / SYNODIC_MONTH_DAYS) * 8.0 + 0.5).floor() as usize % 8;
        Self::ALL[bucket]
    }

    /// Lowercase name, usable as a localization key.
    pub fn name(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "new moon",
            MoonPhase::WaxingCrescent => "waxing crescent",
            MoonPhase::FirstQuarter => "first quarter",
            MoonPhase::WaxingGibbous => "waxing gibbous",
            MoonPhase::FullMoon => "full moon",
            MoonPhase::WaningGibbous => "waning gibbous",
            MoonPhase::LastQuarter => "last quarter",
            MoonPhase::WaningCrescent => "waning crescent",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "🌑",
            MoonPhase::WaxingCrescent => "🌒",
            MoonPhase::FirstQuarter => "🌓",
            MoonPhase::WaxingGibbous => "🌔",
            MoonPhase::FullMoon => "🌕",
            MoonPhase::WaningGibbous => "🌖",
            MoonPhase::LastQuarter => "🌗",
            MoonPhase::WaningCrescent => "🌘",
        }
    }
}

/// Days since the last new moon, in `[0, SYNODIC_MONTH_DAYS)`.
fn lunar_age_days(t: DateTime<Utc>) -> f64 {
    // Reference new moon: 2000-01-06 18:14 UTC.
    let epoch = Utc.with_ymd_and_hms(2000, 1, 6, 18, 14, 0).single();
    let Some(epoch) = epoch else {
        return 0.0;
    };
    let days = (t - epoch).num_seconds() as f64 / 86_400.0;
    days.rem_euclid(SYNODIC_MONTH_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn known_new_and_full_moons() {
        assert_eq!(MoonPhase::at(&utc(2000, 1, 6, 18)), MoonPhase::NewMoon);
        assert_eq!(MoonPhase::at(&utc(2024, 1, 11, 12)), MoonPhase::NewMoon);
        assert_eq!(MoonPhase::at(&utc(2024, 1, 25, 18)), MoonPhase::FullMoon);
    }

    #[test]
    fn quarters_fall_between() {
        assert_eq!(MoonPhase::at(&utc(2024, 1, 18, 3)), MoonPhase::FirstQuarter);
        assert_eq!(MoonPhase::at(&utc(2024, 2, 2, 23)), MoonPhase::LastQuarter);
    }

    #[test]
    fn dates_before_reference_still_resolve() {
        // Full moon of 1999-12-22.
        assert_eq!(MoonPhase::at(&utc(1999, 12, 22, 18)), MoonPhase::FullMoon);
    }

    #[test]
    fn names_and_icons_line_up() {
        assert_eq!(MoonPhase::FullMoon.name(), "full moon");
        assert_eq!(MoonPhase::FullMoon.icon(), "🌕");
    }
}

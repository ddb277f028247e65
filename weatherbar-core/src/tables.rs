//! WMO weather-code lookup tables, built once per process.

use std::collections::HashMap;
use std::sync::LazyLock;

type Table = HashMap<(i32, bool), &'static str>;

// (code, day text, night text)
const CONDITIONS: &[(i32, &str, &str)] = &[
    (0, "Sunny", "Clear"),
    (1, "Mainly sunny", "Mainly clear"),
    (2, "Partly cloudy", "Partly cloudy"),
    (3, "Overcast", "Overcast"),
    (45, "Fog", "Fog"),
    (48, "Depositing rime fog", "Depositing rime fog"),
    (51, "Light drizzle", "Light drizzle"),
    (53, "Drizzle", "Drizzle"),
    (55, "Dense drizzle", "Dense drizzle"),
    (56, "Light freezing drizzle", "Light freezing drizzle"),
    (57, "Freezing drizzle", "Freezing drizzle"),
    (61, "Light rain", "Light rain"),
    (63, "Rain", "Rain"),
    (65, "Heavy rain", "Heavy rain"),
    (66, "Light freezing rain", "Light freezing rain"),
    (67, "Freezing rain", "Freezing rain"),
    (71, "Light snow", "Light snow"),
    (73, "Snow", "Snow"),
    (75, "Heavy snow", "Heavy snow"),
    (77, "Snow grains", "Snow grains"),
    (80, "Light showers", "Light showers"),
    (81, "Showers", "Showers"),
    (82, "Heavy showers", "Heavy showers"),
    (85, "Light snow showers", "Light snow showers"),
    (86, "Snow showers", "Snow showers"),
    (95, "Thunderstorm", "Thunderstorm"),
    (96, "Thunderstorm with light hail", "Thunderstorm with light hail"),
    (99, "Thunderstorm with hail", "Thunderstorm with hail"),
];

// (code, day icon, night icon)
const ICONS: &[(i32, &str, &str)] = &[
    (0, "☀️", "🌙"),
    (1, "🌤️", "🌙"),
    (2, "⛅", "☁️"),
    (3, "☁️", "☁️"),
    (45, "🌫️", "🌫️"),
    (48, "🌫️", "🌫️"),
    (51, "🌦️", "🌧️"),
    (53, "🌦️", "🌧️"),
    (55, "🌧️", "🌧️"),
    (56, "🌧️", "🌧️"),
    (57, "🌧️", "🌧️"),
    (61, "🌦️", "🌧️"),
    (63, "🌧️", "🌧️"),
    (65, "🌧️", "🌧️"),
    (66, "🌨️", "🌨️"),
    (67, "🌨️", "🌨️"),
    (71, "🌨️", "🌨️"),
    (73, "❄️", "❄️"),
    (75, "❄️", "❄️"),
    (77, "🌨️", "🌨️"),
    (80, "🌦️", "🌧️"),
    (81, "🌧️", "🌧️"),
    (82, "🌧️", "🌧️"),
    (85, "🌨️", "🌨️"),
    (86, "🌨️", "🌨️"),
    (95, "⛈️", "⛈️"),
    (96, "⛈️", "⛈️"),
    (99, "⛈️", "⛈️"),
];

fn build(rows: &[(i32, &'static str, &'static str)]) -> Table {
    rows.iter()
        .flat_map(|&(code, day, night)| [((code, true), day), ((code, false), night)])
        .collect()
}

static CONDITION_TABLE: LazyLock<Table> = LazyLock::new(|| build(CONDITIONS));
static ICON_TABLE: LazyLock<Table> = LazyLock::new(|| build(ICONS));

/// Human-readable condition, or `""` for codes the table does not know.
pub fn condition(code: i32, is_day: bool) -> &'static str {
    CONDITION_TABLE.get(&(code, is_day)).copied().unwrap_or("")
}

/// Icon glyph, or `""` for codes the table does not know.
pub fn icon(code: i32, is_day: bool) -> &'static str {
    ICON_TABLE.get(&(code, is_day)).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_sky_differs_between_day_and_night() {
        assert_eq!(condition(0, true), "Sunny");
        assert_eq!(condition(0, false), "Clear");
        assert_eq!(icon(0, true), "☀️");
        assert_eq!(icon(0, false), "🌙");
    }

    #[test]
    fn unknown_codes_are_soft_misses() {
        assert_eq!(condition(42, true), "");
        assert_eq!(icon(42, false), "");
        assert_eq!(icon(-1, true), "");
    }

    #[test]
    fn every_condition_has_an_icon() {
        for &(code, _, _) in CONDITIONS {
            assert!(!icon(code, true).is_empty(), "no day icon for {code}");
            assert!(!icon(code, false).is_empty(), "no night icon for {code}");
        }
    }
}

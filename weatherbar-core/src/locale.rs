//! Display-language lookups.
//!
//! Templates never see message identifiers directly: they ask for semantic
//! keys (`temp`, `winddir`, `full moon`) which are mapped to message ids and
//! resolved through a [`Localizer`].

use std::collections::HashMap;
use std::fmt::Debug;

use chrono::{DateTime, FixedOffset};

/// Source of localized strings.
pub trait Localizer: Send + Sync + Debug {
    /// Localized text for `message_id`.
    fn get(&self, message_id: &str) -> String;

    fn decimal_separator(&self) -> char {
        '.'
    }

    fn group_separator(&self) -> char {
        ','
    }
}

const EN: &[(&str, &str)] = &[
    ("Temperature", "Temperature"),
    ("FeelsLike", "Feels like"),
    ("Humidity", "Humidity"),
    ("WindSpeed", "Wind"),
    ("WindGusts", "Gusts"),
    ("WindDirection", "Wind direction"),
    ("Pressure", "Pressure"),
    ("Precipitation", "Precipitation"),
    ("Condition", "Condition"),
    ("Sunrise", "Sunrise"),
    ("Sunset", "Sunset"),
    ("MoonPhase", "Moon phase"),
    ("Forecast", "Forecast"),
    ("NewMoon", "New moon"),
    ("WaxingCrescent", "Waxing crescent"),
    ("FirstQuarter", "First quarter"),
    ("WaxingGibbous", "Waxing gibbous"),
    ("FullMoon", "Full moon"),
    ("WaningGibbous", "Waning gibbous"),
    ("LastQuarter", "Last quarter"),
    ("WaningCrescent", "Waning crescent"),
    ("RelNow", "now"),
    ("RelAgo", "{} ago"),
    ("RelIn", "in {}"),
    ("RelMinute", "1 minute"),
    ("RelMinutes", "{n} minutes"),
    ("RelHour", "1 hour"),
    ("RelHours", "{n} hours"),
    ("RelDay", "1 day"),
    ("RelDays", "{n} days"),
];

const DE: &[(&str, &str)] = &[
    ("Temperature", "Temperatur"),
    ("FeelsLike", "Gefühlt"),
    ("Humidity", "Luftfeuchtigkeit"),
    ("WindSpeed", "Wind"),
    ("WindGusts", "Böen"),
    ("WindDirection", "Windrichtung"),
    ("Pressure", "Luftdruck"),
    ("Precipitation", "Niederschlag"),
    ("Condition", "Wetterlage"),
    ("Sunrise", "Sonnenaufgang"),
    ("Sunset", "Sonnenuntergang"),
    ("MoonPhase", "Mondphase"),
    ("Forecast", "Vorhersage"),
    ("NewMoon", "Neumond"),
    ("WaxingCrescent", "Zunehmende Sichel"),
    ("FirstQuarter", "Erstes Viertel"),
    ("WaxingGibbous", "Zunehmender Mond"),
    ("FullMoon", "Vollmond"),
    ("WaningGibbous", "Abnehmender Mond"),
    ("LastQuarter", "Letztes Viertel"),
    ("WaningCrescent", "Abnehmende Sichel"),
    ("RelNow", "jetzt"),
    ("RelAgo", "vor {}"),
    ("RelIn", "in {}"),
    ("RelMinute", "1 Minute"),
    ("RelMinutes", "{n} Minuten"),
    ("RelHour", "1 Stunde"),
    ("RelHours", "{n} Stunden"),
    ("RelDay", "1 Tag"),
    ("RelDays", "{n} Tagen"),
];

/// Built-in message catalog for one language, optionally with overrides.
#[derive(Debug, Clone)]
pub struct Catalog {
    lang: String,
    messages: HashMap<String, String>,
    decimal: char,
    group: char,
}

impl Catalog {
    /// Catalog for a language tag such as `de`, `de_DE.UTF-8` or `en-US`.
    /// Unknown languages fall back to English.
    pub fn builtin(tag: &str) -> Self {
        let lang = tag
            .split(['_', '-', '.'])
            .next()
            .unwrap_or_default()
            .to_lowercase();

        let (lang, table, decimal, group) = match lang.as_str() {
            "de" => ("de", DE, ',', '.'),
            _ => ("en", EN, '.', ','),
        };

        Self {
            lang: lang.to_string(),
            messages: table
                .iter()
                .map(|(id, text)| (id.to_string(), text.to_string()))
                .collect(),
            decimal,
            group,
        }
    }

    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = (String, String)>) -> Self {
        self.messages.extend(overrides);
        self
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin("en")
    }
}

impl Localizer for Catalog {
    fn get(&self, message_id: &str) -> String {
        self.messages
            .get(message_id)
            .cloned()
            .unwrap_or_else(|| message_id.to_string())
    }

    fn decimal_separator(&self) -> char {
        self.decimal
    }

    fn group_separator(&self) -> char {
        self.group
    }
}

/// Message id for a lowercase semantic key.
pub fn message_id(key: &str) -> Option<&'static str> {
    let id = match key {
        "temp" | "temperature" => "Temperature",
        "feelslike" | "apparent" => "FeelsLike",
        "humidity" => "Humidity",
        "wind" | "windspeed" => "WindSpeed",
        "gusts" | "windgusts" => "WindGusts",
        "winddir" => "WindDirection",
        "pressure" => "Pressure",
        "precipitation" | "rain" => "Precipitation",
        "condition" => "Condition",
        "sunrise" => "Sunrise",
        "sunset" => "Sunset",
        "moonphase" => "MoonPhase",
        "forecast" => "Forecast",
        "new moon" => "NewMoon",
        "waxing crescent" => "WaxingCrescent",
        "first quarter" => "FirstQuarter",
        "waxing gibbous" => "WaxingGibbous",
        "full moon" => "FullMoon",
        "waning gibbous" => "WaningGibbous",
        "last quarter" => "LastQuarter",
        "waning crescent" => "WaningCrescent",
        _ => return None,
    };
    Some(id)
}

/// Localize a semantic key. Unknown keys come back lowercased.
pub fn localize(localizer: &dyn Localizer, key: &str) -> String {
    let key = key.to_lowercase();
    match message_id(&key) {
        Some(id) => localizer.get(id),
        None => key,
    }
}

/// One decimal digit with locale separators, e.g. `1,013.3` or `1.013,3`.
pub fn humanize_number(localizer: &dyn Localizer, x: f64) -> String {
    if !x.is_finite() {
        return x.to_string();
    }

    let fixed = format!("{:.1}", x.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "0"));

    let group = localizer.group_separator();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(group);
        }
        grouped.push(digit);
    }

    let negative = x < 0.0 && fixed != "0.0";
    format!(
        "{}{grouped}{}{frac_part}",
        if negative { "-" } else { "" },
        localizer.decimal_separator()
    )
}

/// Relative description of `t` as seen from `now`, e.g. `3 hours ago`.
pub fn humanize_since(
    localizer: &dyn Localizer,
    t: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
) -> String {
    let secs = (now - t).num_seconds();
    let abs = secs.unsigned_abs();

    if abs < 45 {
        return localizer.get("RelNow");
    }

    let (n, one, many) = if abs < 45 * 60 {
        (((abs + 30) / 60).max(1), "RelMinute", "RelMinutes")
    } else if abs < 22 * 3600 {
        ((abs + 1800) / 3600, "RelHour", "RelHours")
    } else {
        ((abs + 43_200) / 86_400, "RelDay", "RelDays")
    };

    let span = if n == 1 {
        localizer.get(one)
    } else {
        localizer.get(many).replace("{n}", &n.to_string())
    };

    let direction = if secs >= 0 { "RelAgo" } else { "RelIn" };
    localizer.get(direction).replace("{}", &span)
}

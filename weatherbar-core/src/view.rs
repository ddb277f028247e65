use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::Serialize;

use crate::{
    model::{Coordinates, DayHour, Instant, WeatherData},
    tables,
};

/// An [`Instant`] plus its display condition and icon.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WeatherView {
    #[serde(flatten)]
    pub instant: Instant,
    pub condition: String,
    pub icon: String,
}

pub fn view_from_instant(instant: &Instant) -> WeatherView {
    let code = instant.weather_code.get();
    let is_day = instant.is_day.get().unwrap_or(true);

    let (condition, icon) = match code {
        Some(code) => (tables::condition(code, is_day), tables::icon(code, is_day)),
        None => ("", ""),
    };

    WeatherView {
        instant: instant.clone(),
        condition: condition.to_string(),
        icon: icon.to_string(),
    }
}

/// Views for every forecast entry, earliest first.
pub fn view_slice_from_map(forecast: &HashMap<DayHour, Instant>) -> Vec<WeatherView> {
    let mut views: Vec<WeatherView> = forecast.values().map(view_from_instant).collect();
    views.sort_by_key(|v| v.instant.time);
    views
}

/// Everything a template can see during one render.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateContext {
    pub coordinates: Coordinates,
    pub address: String,
    pub generated_at: DateTime<FixedOffset>,
    pub sunrise: Option<DateTime<FixedOffset>>,
    pub sunset: Option<DateTime<FixedOffset>>,
    pub moon_phase: String,
    pub moon_icon: String,
    pub current: WeatherView,
    pub forecast: Vec<WeatherView>,
}

/// Assemble the render context. Without data the zero context is returned so
/// templates always have something to execute against.
pub fn build_context(
    address: &str,
    data: Option<&WeatherData>,
    sunrise: Option<DateTime<FixedOffset>>,
    sunset: Option<DateTime<FixedOffset>>,
    moon_phase: &str,
    moon_icon: &str,
) -> TemplateContext {
    let Some(data) = data else {
        return TemplateContext::default();
    };

    TemplateContext {
        coordinates: data.coordinates,
        address: address.to_string(),
        generated_at: data.generated_at,
        sunrise,
        sunset,
        moon_phase: moon_phase.to_string(),
        moon_icon: moon_icon.to_string(),
        current: view_from_instant(&data.current),
        forecast: view_slice_from_map(&data.forecast),
    }
}

/// The forecast entry `k` hours after the start of the current hour.
///
/// Returns the zero view when `k` is outside the forecast's index range or no
/// entry sits exactly on the wanted hour.
pub fn forecast_by_offset(ctx: &TemplateContext, k: i64) -> WeatherView {
    let in_range = usize::try_from(k).is_ok_and(|k| k < ctx.forecast.len());
    if !in_range {
        return WeatherView::default();
    }

    let want = DayHour::new(ctx.current.instant.time).to_time() + TimeDelta::hours(k);
    ctx.forecast
        .iter()
        .find(|v| v.instant.time == want)
        .cloned()
        .unwrap_or_default()
}

const COMPASS: &[(f64, f64, &str)] = &[
    (0.0, 22.5, "N"),
    (22.5, 67.5, "NE"),
    (67.5, 112.5, "E"),
    (112.5, 157.5, "SE"),
    (157.5, 202.5, "S"),
    (202.5, 247.5, "SW"),
    (247.5, 292.5, "W"),
    (292.5, 337.5, "NW"),
    (337.5, 360.0, "N"),
];

/// Eight-point compass label for a bearing in degrees. Out-of-range input is `N`.
pub fn compass_bucket(degrees: f64) -> &'static str {
    COMPASS
        .iter()
        .find(|(lo, hi, _)| degrees >= *lo && degrees < *hi)
        .map(|(_, _, label)| *label)
        .unwrap_or("N")
}

/// Arrow pointing where wind from `label` blows to.
pub fn wind_arrow(label: &str) -> &'static str {
    match label.to_uppercase().as_str() {
        "N" => "↓",
        "NE" => "↙",
        "E" => "←",
        "SE" => "↖",
        "S" => "↑",
        "SW" => "↗",
        "W" => "→",
        "NW" => "↘",
        _ => "",
    }
}

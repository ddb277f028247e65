use anyhow::Context;
use serde::Serialize;
use weatherbar_core::{MoonPhase, Renderer, WeatherData, build_context, render::Rendered};

/// One line of Waybar-style custom module output.
#[derive(Debug, Serialize)]
pub struct BarOutput {
    pub text: String,
    pub alt: String,
    pub tooltip: String,
    pub class: &'static str,
}

impl BarOutput {
    pub fn new(rendered: Rendered, fresh: bool) -> Self {
        Self {
            text: rendered.text,
            alt: rendered.alt,
            tooltip: rendered.tooltip,
            class: if fresh { "weather" } else { "stale" },
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("Failed to serialize bar output")
    }
}

/// Render the latest snapshot, or the empty context when nothing was fetched yet.
pub fn render_snapshot(
    renderer: &Renderer,
    address: &str,
    data: Option<&WeatherData>,
) -> weatherbar_core::error::Result<Rendered> {
    let (sunrise, sunset, moon) = match data {
        Some(d) => {
            let sun = d.sun_times(d.generated_at.date_naive());
            (
                sun.map(|s| s.sunrise),
                sun.map(|s| s.sunset),
                MoonPhase::at(&d.generated_at),
            )
        }
        None => (None, None, MoonPhase::at(&chrono::Utc::now())),
    };

    let ctx = build_context(address, data, sunrise, sunset, moon.name(), moon.icon());
    renderer.render(&ctx)
}

//! Status-bar text rendering.
//!
//! Three independent templates (`text`, `alt`, `tooltip`) share one function
//! library and are executed against the same [`TemplateContext`].

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::format::StrftimeItems;
use chrono::{DateTime, FixedOffset, Utc};
use minijinja::{Environment, Error, ErrorKind as TemplateErrorKind, UndefinedBehavior, Value};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, WeatherError},
    locale::{self, Localizer},
    view::{self, TemplateContext, WeatherView},
};

pub const TEXT: &str = "text";
pub const ALT: &str = "alt";
pub const TOOLTIP: &str = "tooltip";

const DEFAULT_TEXT: &str =
    "{{ current.icon }} {{ float(current.temperature, 0) }}{{ current.units.temperature }}";

const DEFAULT_ALT: &str = "{{ current.condition }}";

const DEFAULT_TOOLTIP: &str = r#"{{ address }}
{{ current.icon }} {{ current.condition }}
{{ l("temp") }}: {{ hum(current.temperature) }}{{ current.units.temperature }} ({{ l("feelslike") }} {{ hum(current.apparent_temperature) }}{{ current.units.temperature }})
{{ l("humidity") }}: {{ float(current.humidity, 0) }}{{ current.units.humidity }}
{{ l("wind") }}: {{ hum(current.wind_speed) }} {{ current.units.wind_speed }} {{ wind_arrow(wind_dir(current.wind_direction)) }} {{ wind_dir(current.wind_direction) }}
{{ l("pressure") }}: {{ hum(current.pressure) }} {{ current.units.pressure }}
{{ l("sunrise") }}: {{ fmt_time(sunrise, "%H:%M") }}  {{ l("sunset") }}: {{ fmt_time(sunset, "%H:%M") }}
{{ l("moonphase") }}: {{ moon_icon }} {{ l(moon_phase) }}
{% for k in [1, 2, 3] %}{% set f = forecast_at(k) %}
{{ fmt_time(f.time, "%H:%M") }} {{ f.icon }} {{ float(f.temperature, 0) }}{{ f.units.temperature }} {{ float(f.precipitation_probability, 0) }}%{% endfor %}"#;

/// Template sources, usually supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    pub text: String,
    pub alt: String,
    pub tooltip: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            alt: DEFAULT_ALT.to_string(),
            tooltip: DEFAULT_TOOLTIP.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub text: String,
    pub alt: String,
    pub tooltip: String,
}

#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Compile all three templates and dry-run them once, so references to
    /// unknown fields or functions fail here instead of on the first render.
    pub fn new(templates: &Templates, localizer: Arc<dyn Localizer>) -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        register_functions(&mut env, localizer);

        for (name, source) in [
            (TEXT, &templates.text),
            (ALT, &templates.alt),
            (TOOLTIP, &templates.tooltip),
        ] {
            env.add_template_owned(name, source.clone())
                .map_err(|source| WeatherError::TemplateCompile { name, source })?;
        }

        let renderer = Self { env };

        let probe = TemplateContext {
            forecast: vec![WeatherView::default()],
            ..TemplateContext::default()
        };
        renderer.render(&probe).map_err(|e| match e {
            WeatherError::Render { name, source } => WeatherError::TemplateCompile { name, source },
            other => other,
        })?;

        Ok(renderer)
    }

    /// Render all three outputs. Any failure discards the others.
    pub fn render(&self, ctx: &TemplateContext) -> Result<Rendered> {
        let scope = Scope::new(ctx);

        Ok(Rendered {
            text: self.execute(TEXT, &scope)?,
            alt: self.execute(ALT, &scope)?,
            tooltip: self.execute(TOOLTIP, &scope)?,
        })
    }

    fn execute(&self, name: &'static str, scope: &Scope<'_>) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(scope))
            .map_err(|source| WeatherError::Render { name, source })
    }
}

/// The context as templates see it, plus `forecast_at`, which needs the
/// whole context to resolve an offset.
#[derive(Serialize)]
struct Scope<'a> {
    #[serde(flatten)]
    ctx: &'a TemplateContext,
    forecast_at: Value,
}

impl<'a> Scope<'a> {
    fn new(ctx: &'a TemplateContext) -> Self {
        let shared = Arc::new(ctx.clone());
        let forecast_at = Value::from_function(move |k: i64| {
            Value::from_serialize(view::forecast_by_offset(&shared, k))
        });
        Self { ctx, forecast_at }
    }
}

fn register_functions(env: &mut Environment<'static>, localizer: Arc<dyn Localizer>) {
    env.add_function("fmt_time", |t: Value, pattern: &str| -> Result<String, Error> {
        match timestamp(&t)? {
            Some(t) => format_time(t, pattern),
            None => Ok(String::new()),
        }
    });

    let loc = localizer.clone();
    env.add_function("ago", move |t: Value| -> Result<String, Error> {
        let now = Utc::now().fixed_offset();
        Ok(timestamp(&t)?
            .map(|t| locale::humanize_since(&*loc, t, now))
            .unwrap_or_default())
    });

    env.add_function("float", |x: Value, digits: u32| match number(&x) {
        Some(x) => format_float(x, digits),
        None => x.to_string(),
    });

    let loc = localizer.clone();
    env.add_function("l", move |key: &str| locale::localize(&*loc, key));

    let loc = localizer;
    env.add_function("hum", move |x: Value| match number(&x) {
        Some(x) => locale::humanize_number(&*loc, x),
        None => x.to_string(),
    });

    env.add_function("lower", |s: &str| s.to_lowercase());
    env.add_function("upper", |s: &str| s.to_uppercase());

    env.add_function("wind_dir", |degrees: Value| {
        view::compass_bucket(number(&degrees).unwrap_or(f64::NAN)).to_string()
    });
    env.add_function("wind_arrow", |label: &str| view::wind_arrow(label).to_string());
}

/// Format `x` with `digits` decimals, truncating toward zero instead of rounding.
pub fn format_float(x: f64, digits: u32) -> String {
    let scale = 10f64.powi(digits as i32);
    format!("{:.*}", digits as usize, (x * scale).trunc() / scale)
}

fn number(v: &Value) -> Option<f64> {
    f64::try_from(v.clone()).ok()
}

fn timestamp(v: &Value) -> Result<Option<DateTime<FixedOffset>>, Error> {
    if v.is_undefined() || v.is_none() {
        return Ok(None);
    }
    let s = v.as_str().ok_or_else(|| {
        Error::new(TemplateErrorKind::InvalidOperation, "expected a timestamp")
    })?;
    DateTime::parse_from_rfc3339(s).map(Some).map_err(|e| {
        Error::new(
            TemplateErrorKind::InvalidOperation,
            format!("invalid timestamp '{s}': {e}"),
        )
    })
}

fn format_time(t: DateTime<FixedOffset>, pattern: &str) -> Result<String, Error> {
    let items = StrftimeItems::new(pattern).parse().map_err(|_| {
        Error::new(
            TemplateErrorKind::InvalidOperation,
            format!("invalid time format '{pattern}'"),
        )
    })?;

    let mut out = String::new();
    write!(out, "{}", t.format_with_items(items.iter())).map_err(|_| {
        Error::new(
            TemplateErrorKind::InvalidOperation,
            format!("cannot format time with '{pattern}'"),
        )
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Catalog;
    use crate::model::{Instant, Measure, Units};
    use crate::ErrorKind;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).expect("valid rfc3339")
    }

    fn english() -> Arc<dyn Localizer> {
        Arc::new(Catalog::builtin("en"))
    }

    fn templates(text: &str, alt: &str, tooltip: &str) -> Templates {
        Templates {
            text: text.to_string(),
            alt: alt.to_string(),
            tooltip: tooltip.to_string(),
        }
    }

    fn only_text(text: &str) -> Templates {
        templates(text, "", "")
    }

    fn hour(time: &str, temperature: f64) -> WeatherView {
        view::view_from_instant(&Instant {
            time: at(time),
            temperature: Measure::set(temperature),
            weather_code: Measure::set(3),
            is_day: Measure::set(true),
            ..Instant::default()
        })
    }

    fn sample() -> TemplateContext {
        let current = Instant {
            time: at("2024-01-15T10:45:00+01:00"),
            temperature: Measure::set(-5.3),
            weather_code: Measure::set(0),
            wind_direction: Measure::set(81.0),
            is_day: Measure::set(true),
            units: Units {
                temperature: "°C".to_string(),
                ..Units::default()
            },
            ..Instant::default()
        };

        TemplateContext {
            address: "Berlin".to_string(),
            generated_at: at("2024-01-15T10:50:00+01:00"),
            sunrise: Some(at("2024-01-15T08:12:00+01:00")),
            moon_phase: "full moon".to_string(),
            current: view::view_from_instant(&current),
            forecast: vec![
                hour("2024-01-15T10:00:00+01:00", -5.6),
                hour("2024-01-15T11:00:00+01:00", -4.9),
                hour("2024-01-15T12:00:00+01:00", -4.1),
            ],
            ..TemplateContext::default()
        }
    }

    #[test]
    fn float_truncates_instead_of_rounding() {
        assert_eq!(format_float(2.459, 2), "2.45");
        assert_eq!(format_float(2.999, 0), "2");
        assert_eq!(format_float(-5.37, 1), "-5.3");
        assert_eq!(format_float(81.0, 1), "81.0");
    }

    #[test]
    fn default_templates_render_real_and_zero_contexts() {
        let renderer = Renderer::new(&Templates::default(), english()).unwrap();

        let out = renderer.render(&sample()).unwrap();
        assert_eq!(out.text, "☀️ -5°C");
        assert_eq!(out.alt, "Sunny");
        assert!(out.tooltip.starts_with("Berlin\n"));
        assert!(out.tooltip.contains("Temperature: -5.3°C"));
        assert!(out.tooltip.contains("Sunrise: 08:12"));
        assert!(out.tooltip.contains("Full moon"));
        assert!(out.tooltip.contains("\n11:00 ☁️ -4 N/A%"));

        let empty = renderer.render(&TemplateContext::default()).unwrap();
        assert_eq!(empty.text, " N/A");
    }

    #[test]
    fn function_library() {
        let renderer = Renderer::new(
            &only_text(
                "{{ float(2.459, 2) }}|{{ wind_dir(22.5) }}|{{ wind_arrow('ne') }}|\
                 {{ l('TEMP') }}|{{ l('Visibility') }}|{{ upper('n') }}|{{ lower('NE') }}|\
                 {{ hum(1013.27) }}",
            ),
            english(),
        )
        .unwrap();

        let out = renderer.render(&sample()).unwrap();
        assert_eq!(out.text, "2.45|NE|↙|Temperature|visibility|N|ne|1,013.3");
    }

    #[test]
    fn context_fields_and_time_helpers() {
        let renderer = Renderer::new(
            &only_text(
                "{{ fmt_time(current.time, '%H:%M') }} {{ wind_dir(current.wind_direction) }} \
                 {{ float(current.humidity, 1) }} [{{ fmt_time(sunset, '%H:%M') }}]",
            ),
            english(),
        )
        .unwrap();

        let out = renderer.render(&sample()).unwrap();
        assert_eq!(out.text, "10:45 E N/A []");
    }

    #[test]
    fn localized_humanized_numbers() {
        let renderer = Renderer::new(
            &only_text("{{ hum(current.temperature) }} {{ l('pressure') }}"),
            Arc::new(Catalog::builtin("de")),
        )
        .unwrap();

        let out = renderer.render(&sample()).unwrap();
        assert_eq!(out.text, "-5,3 Luftdruck");
    }

    #[test]
    fn forecast_at_resolves_offsets() {
        let renderer = Renderer::new(
            &only_text(
                "{{ forecast_at(0).temperature }}|{{ forecast_at(2).temperature }}|\
                 {{ forecast_at(5).temperature }}",
            ),
            english(),
        )
        .unwrap();

        let out = renderer.render(&sample()).unwrap();
        assert_eq!(out.text, "-5.6|-4.1|N/A");
    }

    #[test]
    fn syntax_errors_fail_construction() {
        let err = Renderer::new(&templates("ok", "{{ current.icon", ""), english()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateCompile);
        assert!(err.to_string().contains("`alt`"));
    }

    #[test]
    fn self_check_catches_unknown_fields_and_functions() {
        let err = Renderer::new(&only_text("{{ current.visibility }}"), english()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateCompile);

        let err = Renderer::new(&templates("", "", "{{ sparkle(1) }}"), english()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateCompile);
        assert!(err.to_string().contains("`tooltip`"));
    }

    #[test]
    fn render_failure_discards_all_outputs() {
        let renderer = Renderer::new(
            &templates("{{ current.icon }}", "{{ forecast[0].icon }}", "fine"),
            english(),
        )
        .unwrap();

        let err = renderer.render(&TemplateContext::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RenderFailure);
        assert!(err.to_string().contains("`alt`"));
    }

    #[test]
    fn ago_is_relative_to_now() {
        let renderer = Renderer::new(&only_text("{{ ago(generated_at) }}"), english()).unwrap();
        let ctx = TemplateContext {
            generated_at: (Utc::now() - chrono::TimeDelta::hours(3)).fixed_offset(),
            ..TemplateContext::default()
        };
        assert_eq!(renderer.render(&ctx).unwrap().text, "3 hours ago");
    }
}

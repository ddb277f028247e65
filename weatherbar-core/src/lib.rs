//! Core library for the `weatherbar` status-bar widget.
//!
//! This crate defines:
//! - The unit-agnostic weather model (current conditions + hourly forecast)
//! - Provider abstraction and the Open-Meteo response decoder
//! - Presentation views and the template renderer producing bar text
//! - Configuration & localization lookups
//!
//! It is used by `weatherbar-cli`, but can also be reused by other binaries or services.

pub mod astro;
pub mod config;
pub mod decode;
pub mod error;
pub mod locale;
pub mod model;
pub mod provider;
pub mod render;
pub mod tables;
pub mod view;
pub mod zone;

pub use astro::MoonPhase;
pub use config::{Config, LocationConfig};
pub use error::{ErrorKind, WeatherError};
pub use locale::{Catalog, Localizer};
pub use model::{Coordinates, DayHour, Instant, Measure, SunTimes, Units, WeatherData};
pub use provider::{ProviderId, UnitSystem, WeatherProvider, fetch_with_cancel};
pub use render::{Rendered, Renderer, Templates};
pub use view::{TemplateContext, WeatherView, build_context};
pub use zone::ReferenceZone;

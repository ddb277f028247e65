use crate::{
    Config, Coordinates, WeatherData,
    error::{Result, WeatherError},
    provider::openmeteo::OpenMeteoProvider,
    zone::ReferenceZone,
};
use async_trait::async_trait;
use std::{fmt::Debug, str::FromStr};
use tokio_util::sync::CancellationToken;

pub mod openmeteo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenMeteo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "open-meteo",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenMeteo]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "open-meteo" | "openmeteo" => Ok(ProviderId::OpenMeteo),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: open-meteo."
            )),
        }
    }
}

/// Measurement system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    Metric,
    Imperial,
    /// Whatever the provider uses when not told otherwise.
    #[default]
    ProviderDefault,
}

impl FromStr for UnitSystem {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "metric" => UnitSystem::Metric,
            "imperial" => UnitSystem::Imperial,
            _ => UnitSystem::ProviderDefault,
        })
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Fetch one complete snapshot for `coordinates`.
    async fn get_weather(&self, coordinates: Coordinates) -> Result<WeatherData>;
}

/// Run a fetch that is abandoned as soon as `cancel` fires.
///
/// The in-flight request future is dropped on cancellation, so no partially
/// decoded data can escape.
pub async fn fetch_with_cancel(
    provider: &dyn WeatherProvider,
    coordinates: Coordinates,
    cancel: &CancellationToken,
) -> Result<WeatherData> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(WeatherError::Cancelled),
        res = provider.get_weather(coordinates) => res,
    }
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
    zone: ReferenceZone,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let units = config.unit_system();

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenMeteo => Box::new(OpenMeteoProvider::new(units, zone)?),
    };

    Ok(boxed)
}

/// Construct the provider named by the config's `provider` field.
pub fn default_provider_from_config(
    config: &Config,
    zone: ReferenceZone,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.provider_id()?;
    provider_from_config(id, config, zone)
}

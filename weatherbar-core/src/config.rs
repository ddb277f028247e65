use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    model::Coordinates,
    provider::{ProviderId, UnitSystem},
    render::Templates,
};

/// Where to fetch weather for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Display name shown in templates; not geocoded.
    #[serde(default)]
    pub address: Option<String>,
}

impl LocationConfig {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// units = "imperial"
/// lang = "de"
///
/// [location]
/// latitude = 52.52
/// longitude = 13.41
/// address = "Berlin"
///
/// [templates]
/// text = "{{ current.icon }} {{ float(current.temperature, 0) }}"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider short name, e.g. "open-meteo".
    pub provider: String,
    /// "metric", "imperial", or anything else for provider defaults.
    pub units: String,
    pub lang: String,
    pub interval_secs: u64,
    pub location: Option<LocationConfig>,
    pub templates: Templates,
    /// Message overrides for the localizer, keyed by message id.
    pub messages: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderId::OpenMeteo.as_str().to_string(),
            units: "metric".to_string(),
            lang: "en".to_string(),
            interval_secs: 600,
            location: None,
            templates: Templates::default(),
            messages: HashMap::new(),
        }
    }
}

impl Config {
    pub fn provider_id(&self) -> Result<ProviderId> {
        ProviderId::try_from(self.provider.as_str())
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.units.parse().unwrap_or_default()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// The configured location, or an error with a hint on how to set one.
    pub fn location(&self) -> Result<&LocationConfig> {
        self.location.as_ref().ok_or_else(|| {
            anyhow!(
                "No location configured.\n\
                 Hint: run `weatherbar configure` or pass --lat and --lon."
            )
        })
    }

    pub fn set_location(&mut self, latitude: f64, longitude: f64, address: Option<String>) {
        self.location = Some(LocationConfig {
            latitude,
            longitude,
            address,
        });
    }

    /// Load config from the default path, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherbar", "weatherbar")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_open_meteo_metric_english() {
        let cfg = Config::default();

        assert_eq!(cfg.provider_id().unwrap(), ProviderId::OpenMeteo);
        assert_eq!(cfg.unit_system(), UnitSystem::Metric);
        assert_eq!(cfg.lang, "en");
        assert_eq!(cfg.interval(), Duration::from_secs(600));
        assert_eq!(cfg.templates, Templates::default());
    }

    #[test]
    fn location_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.location().unwrap_err();

        assert!(err.to_string().contains("No location configured"));
        assert!(err.to_string().contains("weatherbar configure"));
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let cfg: Config = toml::from_str(
            r#"
            units = "Imperial"

            [location]
            latitude = 40.71
            longitude = -74.01

            [templates]
            text = "{{ current.temperature }}"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.unit_system(), UnitSystem::Imperial);
        assert_eq!(cfg.location().unwrap().coordinates(), Coordinates::new(40.71, -74.01));
        assert_eq!(cfg.location().unwrap().address, None);
        assert_eq!(cfg.templates.text, "{{ current.temperature }}");
        assert_eq!(cfg.templates.alt, Templates::default().alt);
        assert_eq!(cfg.provider, "open-meteo");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.location.is_none());
    }

    #[test]
    fn save_then_load_preserves_location_and_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_location(52.52, 13.41, Some("Berlin".into()));
        cfg.messages.insert("Temperature".into(), "Temp".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.location, cfg.location);
        assert_eq!(loaded.messages.get("Temperature").map(String::as_str), Some("Temp"));
    }

    #[test]
    fn interval_is_never_zero() {
        let cfg = Config {
            interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(cfg.interval(), Duration::from_secs(1));
    }
}

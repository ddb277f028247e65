use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Select, Text};
use tokio_util::sync::CancellationToken;
use weatherbar_core::{
    Catalog, Config, ErrorKind, ReferenceZone, Renderer, WeatherData, fetch_with_cancel,
    provider::default_provider_from_config,
};

use crate::output::{BarOutput, render_snapshot};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbar", version, about = "Weather for your status bar")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set location, units and language.
    Configure,

    /// Print bar output, refreshing on the configured interval.
    Show(ShowArgs),
}

#[derive(Debug, Default, Args)]
pub struct ShowArgs {
    /// Latitude in decimal degrees.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Display name for the location.
    #[arg(long)]
    pub address: Option<String>,

    /// "metric" or "imperial"; anything else uses provider defaults.
    #[arg(long)]
    pub units: Option<String>,

    /// Display language, e.g. "en" or "de".
    #[arg(long)]
    pub lang: Option<String>,

    /// Print a single update and exit.
    #[arg(long)]
    pub once: bool,
}

impl ShowArgs {
    /// Layer command-line values over the file configuration.
    fn apply(&self, config: &mut Config) {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            let address = self
                .address
                .clone()
                .or_else(|| config.location.as_ref().and_then(|l| l.address.clone()));
            config.set_location(lat, lon, address);
        } else if let (Some(address), Some(location)) = (&self.address, config.location.as_mut()) {
            location.address = Some(address.clone());
        }
        if let Some(units) = &self.units {
            config.units = units.clone();
        }
        if let Some(lang) = &self.lang {
            config.lang = lang.clone();
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        let mut config = Config::load_from(&path)?;

        match self.command {
            Command::Configure => {
                configure(&mut config)?;
                config.save_to(&path)?;
                println!("Saved configuration to {}", path.display());
            }
            Command::Show(args) => {
                args.apply(&mut config);
                show(&config, args.once).await?;
            }
        }

        Ok(())
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let current = config.location.clone();

    let mut lat = CustomType::<f64>::new("Latitude:");
    let mut lon = CustomType::<f64>::new("Longitude:");
    if let Some(loc) = &current {
        lat = lat.with_default(loc.latitude);
        lon = lon.with_default(loc.longitude);
    }
    let latitude = lat.prompt()?;
    let longitude = lon.prompt()?;

    let address = Text::new("Display name (optional):")
        .with_default(current.and_then(|l| l.address).as_deref().unwrap_or(""))
        .prompt()?;
    let address = Some(address.trim().to_string()).filter(|a| !a.is_empty());

    let units = Select::new("Units:", vec!["metric", "imperial"]).prompt()?;
    let lang = Text::new("Language:").with_default(&config.lang).prompt()?;

    config.set_location(latitude, longitude, address);
    config.units = units.to_string();
    config.lang = lang.trim().to_string();
    Ok(())
}

async fn show(config: &Config, once: bool) -> anyhow::Result<()> {
    let location = config.location()?;
    let coordinates = location.coordinates();
    let address = location.address.clone().unwrap_or_default();

    let zone = ReferenceZone::detect();
    let provider = default_provider_from_config(config, zone)?;

    let catalog = Catalog::builtin(&config.lang).with_overrides(config.messages.clone());
    let renderer =
        Renderer::new(&config.templates, Arc::new(catalog)).context("Invalid templates")?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    tracing::info!(
        provider = provider.name(),
        lat = coordinates.lat,
        lon = coordinates.lon,
        timezone = %zone.query_param(),
        "starting"
    );

    // Last good snapshot; a failed fetch leaves it untouched.
    let mut snapshot: Option<WeatherData> = None;
    let mut ticker = tokio::time::interval(config.interval());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let fresh = match fetch_with_cancel(provider.as_ref(), coordinates, &cancel).await {
            Ok(data) => {
                snapshot = Some(data);
                true
            }
            Err(e) if e.kind() == ErrorKind::Cancelled => break,
            Err(e) => {
                tracing::warn!(error = %e, kind = %e.kind(), "fetch failed, keeping previous data");
                false
            }
        };

        match render_snapshot(&renderer, &address, snapshot.as_ref()) {
            Ok(rendered) => println!("{}", BarOutput::new(rendered, fresh).to_json()?),
            Err(e) => tracing::error!(error = %e, "render failed"),
        }

        if once {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "weatherbar", "show", "--lat", "-33.87", "--lon", "151.21", "--once",
        ])
        .unwrap();

        match cli.command {
            Command::Show(args) => {
                assert_eq!(args.lat, Some(-33.87));
                assert_eq!(args.lon, Some(151.21));
                assert!(args.once);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn lat_without_lon_is_rejected() {
        assert!(Cli::try_parse_from(["weatherbar", "show", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = Config::default();
        config.set_location(1.0, 2.0, Some("Home".into()));

        let args = ShowArgs {
            lat: Some(52.52),
            lon: Some(13.41),
            units: Some("imperial".into()),
            lang: Some("de".into()),
            ..ShowArgs::default()
        };
        args.apply(&mut config);

        let location = config.location().unwrap();
        assert_eq!((location.latitude, location.longitude), (52.52, 13.41));
        assert_eq!(location.address.as_deref(), Some("Home"));
        assert_eq!(config.unit_system(), weatherbar_core::UnitSystem::Imperial);
        assert_eq!(config.lang, "de");
    }

    #[test]
    fn address_alone_renames_configured_location() {
        let mut config = Config::default();
        config.set_location(1.0, 2.0, None);

        let args = ShowArgs {
            address: Some("Office".into()),
            ..ShowArgs::default()
        };
        args.apply(&mut config);

        let location = config.location().unwrap();
        assert_eq!(location.address.as_deref(), Some("Office"));
        assert_eq!(location.latitude, 1.0);
    }
}

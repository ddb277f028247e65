use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    decode::{DayStamp, Flag, HourStamp},
    error::{Result, WeatherError},
    model::{Coordinates, DayHour, Instant, Measure, SunTimes, Units, WeatherData},
    provider::UnitSystem,
    zone::ReferenceZone,
};

use super::WeatherProvider;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT_SECS: u64 = 10;

const CURRENT_FIELDS: &[&str] = &[
    "temperature_2m",
    "apparent_temperature",
    "is_day",
    "weather_code",
    "wind_speed_10m",
    "wind_gusts_10m",
    "wind_direction_10m",
    "relative_humidity_2m",
    "pressure_msl",
];

const HOURLY_FIELDS: &[&str] = &[
    "temperature_2m",
    "apparent_temperature",
    "is_day",
    "precipitation_probability",
    "weather_code",
    "wind_speed_10m",
    "wind_gusts_10m",
    "wind_direction_10m",
    "relative_humidity_2m",
    "pressure_msl",
];

const DAILY_FIELDS: &[&str] = &["sunrise", "sunset"];

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    base_url: String,
    units: UnitSystem,
    zone: ReferenceZone,
}

impl OpenMeteoProvider {
    pub fn new(units: UnitSystem, zone: ReferenceZone) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: FORECAST_URL.to_string(),
            units,
            zone,
        })
    }

    /// Point the provider at another endpoint, e.g. a self-hosted instance.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn query(&self, coordinates: Coordinates) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("latitude", coordinates.lat.to_string()),
            ("longitude", coordinates.lon.to_string()),
            ("current", CURRENT_FIELDS.join(",")),
            ("hourly", HOURLY_FIELDS.join(",")),
            ("daily", DAILY_FIELDS.join(",")),
            ("past_days", "1".to_string()),
            ("timezone", self.zone.query_param().into_owned()),
        ];

        let units = match self.units {
            UnitSystem::Metric => Some(("celsius", "kmh", "mm")),
            UnitSystem::Imperial => Some(("fahrenheit", "mph", "inch")),
            UnitSystem::ProviderDefault => None,
        };
        if let Some((temperature, wind_speed, precipitation)) = units {
            query.push(("temperature_unit", temperature.to_string()));
            query.push(("wind_speed_unit", wind_speed.to_string()));
            query.push(("precipitation_unit", precipitation.to_string()));
        }

        query
    }

    /// Map a raw forecast body onto the domain model.
    ///
    /// `coordinates` are stored as given; the provider's echoed position may be
    /// snapped to its grid.
    pub fn decode(
        &self,
        body: &str,
        coordinates: Coordinates,
        generated_at: DateTime<FixedOffset>,
    ) -> Result<WeatherData> {
        let parsed: OmResponse = serde_json::from_str(body)?;

        let current = parsed.current.into_instant(&self.zone, &parsed.current_units);
        let forecast = parsed.hourly.into_forecast(&self.zone, &parsed.hourly_units)?;
        let daily = match parsed.daily {
            Some(daily) => daily.into_sun_times(&self.zone)?,
            None => BTreeMap::new(),
        };

        Ok(WeatherData {
            generated_at,
            coordinates,
            current,
            forecast,
            daily,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    fn name(&self) -> &str {
        "open-meteo"
    }

    async fn get_weather(&self, coordinates: Coordinates) -> Result<WeatherData> {
        let query = self.query(coordinates);
        tracing::debug!(url = %self.base_url, ?query, "requesting forecast");

        let res = self.http.get(&self.base_url).query(&query).send().await?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(WeatherError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = res.text().await?;
        let data = self.decode(&body, coordinates, self.zone.now())?;

        tracing::debug!(hours = data.forecast.len(), "forecast decoded");
        Ok(data)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmUnits {
    temperature_2m: String,
    wind_speed_10m: String,
    relative_humidity_2m: String,
    pressure_msl: String,
    wind_direction_10m: String,
}

impl From<&OmUnits> for Units {
    fn from(u: &OmUnits) -> Self {
        Units {
            temperature: u.temperature_2m.clone(),
            wind_speed: u.wind_speed_10m.clone(),
            humidity: u.relative_humidity_2m.clone(),
            pressure: u.pressure_msl.clone(),
            wind_direction: u.wind_direction_10m.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: HourStamp,
    temperature_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    is_day: Flag,
    weather_code: Option<i32>,
    wind_speed_10m: Option<f64>,
    wind_gusts_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    pressure_msl: Option<f64>,
}

impl OmCurrent {
    fn into_instant(self, zone: &ReferenceZone, units: &OmUnits) -> Instant {
        Instant {
            time: zone.localize(self.time.0),
            temperature: self.temperature_2m.into(),
            apparent_temperature: self.apparent_temperature.into(),
            weather_code: self.weather_code.into(),
            wind_speed: self.wind_speed_10m.into(),
            wind_gusts: self.wind_gusts_10m.into(),
            wind_direction: self.wind_direction_10m.into(),
            humidity: self.relative_humidity_2m.into(),
            precipitation_probability: Measure::unset(),
            pressure: self.pressure_msl.into(),
            is_day: Measure::set(self.is_day.0),
            units: units.into(),
        }
    }
}

/// Hourly series are parallel arrays indexed by position in `time`.
#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<HourStamp>,
    temperature_2m: Option<Vec<Option<f64>>>,
    apparent_temperature: Option<Vec<Option<f64>>>,
    is_day: Option<Vec<Flag>>,
    precipitation_probability: Option<Vec<Option<f64>>>,
    weather_code: Option<Vec<Option<i32>>>,
    wind_speed_10m: Option<Vec<Option<f64>>>,
    wind_gusts_10m: Option<Vec<Option<f64>>>,
    wind_direction_10m: Option<Vec<Option<f64>>>,
    relative_humidity_2m: Option<Vec<Option<f64>>>,
    pressure_msl: Option<Vec<Option<f64>>>,
}

impl OmHourly {
    fn into_forecast(
        self,
        zone: &ReferenceZone,
        units: &OmUnits,
    ) -> Result<HashMap<DayHour, Instant>> {
        let len = self.time.len();
        let temperature = Column::new("hourly.temperature_2m", &self.temperature_2m, len)?;
        let apparent = Column::new("hourly.apparent_temperature", &self.apparent_temperature, len)?;
        let is_day = Column::new("hourly.is_day", &self.is_day, len)?;
        let precipitation = Column::new(
            "hourly.precipitation_probability",
            &self.precipitation_probability,
            len,
        )?;
        let code = Column::new("hourly.weather_code", &self.weather_code, len)?;
        let wind_speed = Column::new("hourly.wind_speed_10m", &self.wind_speed_10m, len)?;
        let wind_gusts = Column::new("hourly.wind_gusts_10m", &self.wind_gusts_10m, len)?;
        let wind_direction =
            Column::new("hourly.wind_direction_10m", &self.wind_direction_10m, len)?;
        let humidity = Column::new("hourly.relative_humidity_2m", &self.relative_humidity_2m, len)?;
        let pressure = Column::new("hourly.pressure_msl", &self.pressure_msl, len)?;

        let units = Units::from(units);
        let mut forecast = HashMap::with_capacity(len);

        for (i, stamp) in self.time.iter().enumerate() {
            let key = DayHour::new(zone.localize(stamp.0));
            let instant = Instant {
                time: key.to_time(),
                temperature: temperature.measure(i),
                apparent_temperature: apparent.measure(i),
                weather_code: code.measure(i),
                wind_speed: wind_speed.measure(i),
                wind_gusts: wind_gusts.measure(i),
                wind_direction: wind_direction.measure(i),
                humidity: humidity.measure(i),
                precipitation_probability: precipitation.measure(i),
                pressure: pressure.measure(i),
                is_day: is_day.get(i).map(|f| f.0).into(),
                units: units.clone(),
            };
            // Last entry for an hour wins.
            forecast.insert(key, instant);
        }

        Ok(forecast)
    }
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<DayStamp>,
    sunrise: Option<Vec<HourStamp>>,
    sunset: Option<Vec<HourStamp>>,
}

impl OmDaily {
    fn into_sun_times(self, zone: &ReferenceZone) -> Result<BTreeMap<chrono::NaiveDate, SunTimes>> {
        let len = self.time.len();
        let sunrise = Column::new("daily.sunrise", &self.sunrise, len)?;
        let sunset = Column::new("daily.sunset", &self.sunset, len)?;

        let mut days = BTreeMap::new();
        for (i, DayStamp(date)) in self.time.iter().enumerate() {
            if let (Some(rise), Some(set)) = (sunrise.get(i), sunset.get(i)) {
                days.insert(
                    *date,
                    SunTimes {
                        day: zone.midnight(*date),
                        sunrise: zone.localize(rise.0),
                        sunset: zone.localize(set.0),
                    },
                );
            }
        }
        Ok(days)
    }
}

/// An optional series, checked once against the length of its time axis.
struct Column<'a, T>(Option<&'a [T]>);

impl<'a, T: Copy> Column<'a, T> {
    fn new(field: &'static str, values: &'a Option<Vec<T>>, expected: usize) -> Result<Self> {
        match values {
            Some(v) if v.len() != expected => Err(WeatherError::ShapeMismatch {
                field,
                expected,
                actual: v.len(),
            }),
            other => Ok(Column(other.as_deref())),
        }
    }

    fn get(&self, i: usize) -> Option<T> {
        self.0.and_then(|v| v.get(i).copied())
    }
}

impl<V: Copy> Column<'_, Option<V>> {
    fn measure(&self, i: usize) -> Measure<V> {
        self.get(i).flatten().into()
    }
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    #[serde(default)]
    current_units: OmUnits,
    current: OmCurrent,
    #[serde(default)]
    hourly_units: OmUnits,
    hourly: OmHourly,
    daily: Option<OmDaily>,
}

mod models;

use std::time::Duration;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{error, info};
use reqwest::blocking::Client;
use thiserror::Error;
use crate::config::Config;
use crate::models::{Current, Daily, Location, WeatherRecord};
use crate::manager_forecast::models::{ApiErrorBody, CurrentBlock, DailyBlock, ForecastDocument, LocationForecast};

/// Always a single day, so the first entry of every daily series is the only one
const FORECAST_DAYS: u8 = 1;

/// Current variables requested from the weather source
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CurrentMetric {
    Temperature,
}

impl CurrentMetric {
    pub const ALL: [CurrentMetric; 1] = [CurrentMetric::Temperature];

    /// Name of the variable in the weather source's api
    pub fn api_name(self) -> &'static str {
        match self {
            CurrentMetric::Temperature => "temperature_2m",
        }
    }
}

/// Daily variables requested from the weather source.
/// The same list builds the request and is used to look values up in the response.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DailyMetric {
    TemperatureMax,
    TemperatureMin,
    PrecipitationProbabilityMax,
    WindGustsMax,
    CloudCoverMean,
}

impl DailyMetric {
    pub const ALL: [DailyMetric; 5] = [
        DailyMetric::TemperatureMax,
        DailyMetric::TemperatureMin,
        DailyMetric::PrecipitationProbabilityMax,
        DailyMetric::WindGustsMax,
        DailyMetric::CloudCoverMean,
    ];

    /// Name of the variable in the weather source's api
    pub fn api_name(self) -> &'static str {
        match self {
            DailyMetric::TemperatureMax => "temperature_2m_max",
            DailyMetric::TemperatureMin => "temperature_2m_min",
            DailyMetric::PrecipitationProbabilityMax => "precipitation_probability_max",
            DailyMetric::WindGustsMax => "wind_gusts_10m_max",
            DailyMetric::CloudCoverMean => "cloud_cover_mean",
        }
    }
}

/// Struct for fetching and shaping weather forecasts
pub struct Forecast {
    client: Client,
    base_url: String,
    lat: f64,
    long: f64,
    timezone: String,
    model: String,
    wind_speed_unit: String,
    temperature_unit: String,
    precipitation_unit: String,
}

impl Forecast {
    /// Returns a forecast struct ready for fetching and processing weather forecasts
    ///
    /// # Arguments
    ///
    /// * 'config' - configuration to use
    pub fn new(config: &Config) -> Result<Forecast, ForecastError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.forecast.timeout_secs))
            .build()?;

        Ok(Forecast {
            client,
            base_url: config.forecast.base_url.clone(),
            lat: config.geo_ref.lat,
            long: config.geo_ref.long,
            timezone: config.forecast.timezone.clone(),
            model: config.forecast.model.clone(),
            wind_speed_unit: config.forecast.wind_speed_unit.clone(),
            temperature_unit: config.forecast.temperature_unit.clone(),
            precipitation_unit: config.forecast.precipitation_unit.clone(),
        })
    }

    /// Fetches today's forecast. Any failure is logged and gives None, meaning
    /// there is nothing to pass on for this run.
    pub fn fetch_forecast(&self) -> Option<WeatherRecord> {
        match self.new_forecast() {
            Ok(record) => Some(record),
            Err(e) => {
                error!("Error fetching weather data: {}", e);
                None
            }
        }
    }

    /// Retrieves today's forecast and shapes it into a weather record
    pub fn new_forecast(&self) -> Result<WeatherRecord, ForecastError> {
        info!("Fetching weather data for {}, {} at {}", self.lat, self.long, Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

        let daily = DailyMetric::ALL.iter()
            .map(|m| m.api_name())
            .collect::<Vec<&str>>()
            .join(",");
        let current = CurrentMetric::ALL.iter()
            .map(|m| m.api_name())
            .collect::<Vec<&str>>()
            .join(",");

        let query = vec![
            ("latitude", self.lat.to_string()),
            ("longitude", self.long.to_string()),
            ("daily", daily),
            ("current", current),
            ("models", self.model.clone()),
            ("timezone", self.timezone.clone()),
            ("forecast_days", FORECAST_DAYS.to_string()),
            ("wind_speed_unit", self.wind_speed_unit.clone()),
            ("temperature_unit", self.temperature_unit.clone()),
            ("precipitation_unit", self.precipitation_unit.clone()),
            ("timeformat", "unixtime".to_string()),
        ];

        let response = self.client
            .get(&self.base_url)
            .query(&query)
            .send()?;

        let status = response.status();
        let json = response.text()?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ApiErrorBody>(&json)
                .map(|b| b.reason)
                .unwrap_or(json);
            return Err(ForecastError::ApiError { status: status.as_u16(), reason });
        }

        let document: ForecastDocument = serde_json::from_str(&json)
            .map_err(|e| ForecastError::DocumentError(e.to_string()))?;
        let location = document.into_first()
            .ok_or(ForecastError::NoLocationError)?;

        let record = to_record(location)?;

        if let Ok(pretty) = serde_json::to_string_pretty(&record) {
            info!("Weather data processed:\n{}", pretty);
        }

        Ok(record)
    }
}

/// Shapes one location's forecast into a weather record
///
/// # Arguments
///
/// * 'location' - location forecast as given by the weather source
fn to_record(location: LocationForecast) -> Result<WeatherRecord, ForecastError> {
    let offset = location.utc_offset_seconds;
    let current = location.current.ok_or(ForecastError::MissingBlockError("current"))?;
    let daily = location.daily.ok_or(ForecastError::MissingBlockError("daily"))?;

    Ok(WeatherRecord {
        location: Location {
            latitude: location.latitude,
            longitude: location.longitude,
            timezone: location.timezone,
            timezone_abbreviation: location.timezone_abbreviation,
            utc_offset_seconds: offset,
        },
        current: Current {
            time: local_iso_time(current.time, offset)?,
            temperature2m: current_value(&current, CurrentMetric::Temperature),
        },
        daily: Daily {
            time: local_iso_time(*daily.time.first().ok_or(ForecastError::MissingValueError("time".into()))?, offset)?,
            temperature2m_max: daily_value(&daily, DailyMetric::TemperatureMax),
            temperature2m_min: daily_value(&daily, DailyMetric::TemperatureMin),
            precipitation_probability_max: daily_value(&daily, DailyMetric::PrecipitationProbabilityMax),
            wind_gusts10m_max: daily_value(&daily, DailyMetric::WindGustsMax),
            cloud_cover_mean: daily_value(&daily, DailyMetric::CloudCoverMean),
        },
    })
}

/// Shifts a UTC epoch timestamp by the location's offset and renders it as ISO-8601,
/// so the wall clock shown is the one at the location.
///
/// # Arguments
///
/// * 'time' - seconds since epoch
/// * 'offset' - the location's offset from UTC in seconds
fn local_iso_time(time: i64, offset: i64) -> Result<String, ForecastError> {
    let shifted = time.checked_add(offset)
        .and_then(|t| DateTime::<Utc>::from_timestamp(t, 0))
        .ok_or(ForecastError::TimestampError(time))?;

    Ok(shifted.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// A null, missing or non-finite value is passed on as None rather than failing the record
fn current_value(block: &CurrentBlock, metric: CurrentMetric) -> Option<f64> {
    block.variables.get(metric.api_name())
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
}

fn daily_value(block: &DailyBlock, metric: DailyMetric) -> Option<f64> {
    block.variables.get(metric.api_name())
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("NetworkError: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("ApiError: status {status}: {reason}")]
    ApiError { status: u16, reason: String },
    #[error("DocumentError: {0}")]
    DocumentError(String),
    #[error("NoLocationError: response holds no location")]
    NoLocationError,
    #[error("MissingBlockError: no {0} block in response")]
    MissingBlockError(&'static str),
    #[error("MissingValueError: {0}")]
    MissingValueError(String),
    #[error("TimestampError: {0} out of range")]
    TimestampError(i64),
}

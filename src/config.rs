use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides the configured webhook url
pub const WEBHOOK_URL_VAR: &str = "WEBHOOK_URL";

/// Value shipped in templates, treated the same as an unset webhook url
pub const WEBHOOK_URL_PLACEHOLDER: &str = "YOUR_WEBHOOK_URL_HERE";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GeoRef {
    pub lat: f64,
    pub long: f64,
}

impl Default for GeoRef {
    fn default() -> Self {
        Self { lat: 37.1673, long: -87.6925 }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ForecastParameters {
    pub base_url: String,
    pub model: String,
    pub timezone: String,
    pub wind_speed_unit: String,
    pub temperature_unit: String,
    pub precipitation_unit: String,
    pub timeout_secs: u64,
}

impl Default for ForecastParameters {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1/forecast".into(),
            model: "gfs_hrrr".into(),
            timezone: "America/Chicago".into(),
            wind_speed_unit: "mph".into(),
            temperature_unit: "fahrenheit".into(),
            precipitation_unit: "inch".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WebhookParameters {
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for WebhookParameters {
    fn default() -> Self {
        Self { url: None, timeout_secs: 30 }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ScheduleParameters {
    pub cron: String,
    pub timezone: String,
}

impl Default for ScheduleParameters {
    fn default() -> Self {
        Self {
            cron: "0 7 * * *".into(),
            timezone: "America/Chicago".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct General {
    pub log_path: Option<String>,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LevelFilter::Info,
            log_to_stdout: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub geo_ref: GeoRef,
    pub forecast: ForecastParameters,
    pub webhook: WebhookParameters,
    pub schedule: ScheduleParameters,
    pub general: General,
}

/// Loads the configuration file (if any) and returns a struct with all configuration items.
/// Missing sections and keys fall back to their defaults.
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file, None gives a default configuration
/// * 'env' - lookup function for environment overrides
pub fn load_config<F>(config_path: Option<&str>, env: F) -> Result<Config, LoadConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match config_path {
        Some(path) => {
            let toml = fs::read_to_string(path)
                .map_err(|e| LoadConfigurationError::Read(format!("{}: {}", path, e)))?;
            toml::from_str::<Config>(&toml)
                .map_err(|e| LoadConfigurationError::Parse(format!("{}: {}", path, e)))?
        }
        None => Config::default(),
    };

    if let Some(url) = env(WEBHOOK_URL_VAR) {
        config.webhook.url = Some(url);
    }
    config.webhook.url = config.webhook.url.filter(|u| is_webhook_target(u));

    Ok(config)
}

/// Tells whether a webhook url value is an actual delivery target
///
/// # Arguments
///
/// * 'url' - the configured value
fn is_webhook_target(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && url != WEBHOOK_URL_PLACEHOLDER
}

/// Error depicting errors that occur while loading the configuration
///
#[derive(Debug, Error)]
pub enum LoadConfigurationError {
    #[error("error reading configuration file: {0}")]
    Read(String),
    #[error("error parsing configuration file: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_file() {
        let config = load_config(None, no_env).unwrap();

        assert_eq!(config.geo_ref.lat, 37.1673);
        assert_eq!(config.geo_ref.long, -87.6925);
        assert_eq!(config.forecast.timezone, "America/Chicago");
        assert_eq!(config.forecast.model, "gfs_hrrr");
        assert_eq!(config.schedule.cron, "0 7 * * *");
        assert_eq!(config.general.log_level, LevelFilter::Info);
        assert!(config.webhook.url.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[geo_ref]\nlat = 59.33\nlong = 18.06\n\n[general]\nlog_level = \"debug\"\nlog_to_stdout = false").unwrap();

        let config = load_config(file.path().to_str(), no_env).unwrap();

        assert_eq!(config.geo_ref.lat, 59.33);
        assert_eq!(config.geo_ref.long, 18.06);
        assert_eq!(config.general.log_level, LevelFilter::Debug);
        assert!(!config.general.log_to_stdout);
        assert_eq!(config.forecast.temperature_unit, "fahrenheit");
        assert_eq!(config.webhook.timeout_secs, 30);
    }

    #[test]
    fn env_overrides_file_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[webhook]\nurl = \"http://file.example/hook\"").unwrap();

        let config = load_config(file.path().to_str(), |k| {
            (k == WEBHOOK_URL_VAR).then(|| "http://env.example/hook".to_string())
        }).unwrap();

        assert_eq!(config.webhook.url.as_deref(), Some("http://env.example/hook"));
    }

    #[test]
    fn placeholder_and_empty_url_are_unset() {
        let config = load_config(None, |_| Some(WEBHOOK_URL_PLACEHOLDER.to_string())).unwrap();
        assert!(config.webhook.url.is_none());

        let config = load_config(None, |_| Some("  ".to_string())).unwrap();
        assert!(config.webhook.url.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_config(Some("/nonexistent/forecast_webhook.toml"), no_env);
        assert!(matches!(result, Err(LoadConfigurationError::Read(_))));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[geo_ref\nlat = ").unwrap();

        let result = load_config(file.path().to_str(), no_env);
        assert!(matches!(result, Err(LoadConfigurationError::Parse(_))));
    }
}

use std::env;
use log::{info, warn};
use thiserror::Error;
use crate::config::{load_config, Config, LoadConfigurationError};
use crate::logging::{setup_logger, LoggerError};
use crate::manager_forecast::{Forecast, ForecastError};
use crate::manager_webhook::{Webhook, WebhookError};
use crate::scheduling::{SchedulingError, Trigger};

pub struct Mgr {
    pub forecast: Forecast,
    pub webhook: Webhook,
    pub trigger: Trigger,
}

/// Command line arguments
#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub config_path: Option<String>,
    pub run_once: bool,
}

/// Initializes and returns arguments, configuration and a Mgr struct holding the initialized structs
///
pub fn init() -> Result<(Args, Config, Mgr), InitializationError> {
    let args = parse_args(env::args().skip(1));

    // Load configuration
    let config = load_config(args.config_path.as_deref(), |k| env::var(k).ok())?;

    // Setup logging
    let _ = setup_logger(&config.general.log_path, config.general.log_level, config.general.log_to_stdout)?;

    // Print version
    info!("starting forecast webhook version: {}", env!("CARGO_PKG_VERSION"));

    // Instantiate structs
    let forecast = Forecast::new(&config)?;
    let webhook = Webhook::new(&config.webhook)?;
    let trigger = Trigger::new(&config.schedule.cron, &config.schedule.timezone)?;

    match webhook.target() {
        Some(url) => info!("Webhook URL is configured to: {}", url),
        None => warn!("Warning: WEBHOOK_URL is not set. Please set it as an environment variable or in the configuration file."),
    }

    let mgr = Mgr {
        forecast,
        webhook,
        trigger,
    };

    Ok((args, config, mgr))
}

/// Parses command line arguments, program name excluded. Unknown arguments are ignored.
///
/// # Arguments
///
/// * 'args' - the arguments
fn parse_args<I>(args: I) -> Args
where
    I: IntoIterator<Item = String>,
{
    let mut result = Args::default();

    for arg in args {
        if let Some(path) = arg.strip_prefix("--config=") {
            result.config_path = Some(path.to_string());
        } else if arg == "--run-once" {
            result.run_once = true;
        }
    }

    result
}

/// Error depicting errors that occur while initializing
///
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("ConfigurationError: {0}")]
    ConfigurationError(#[from] LoadConfigurationError),
    #[error("SetupLoggerError: {0}")]
    SetupLoggerError(#[from] LoggerError),
    #[error("ForecastSetupError: {0}")]
    ForecastSetupError(#[from] ForecastError),
    #[error("WebhookSetupError: {0}")]
    WebhookSetupError(#[from] WebhookError),
    #[error("ScheduleSetupError: {0}")]
    ScheduleSetupError(#[from] SchedulingError),
}

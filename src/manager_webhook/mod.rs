use std::fmt;
use std::time::Duration;
use log::{error, info, log, Level};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use crate::config::WebhookParameters;
use crate::models::WeatherRecord;

/// Struct for delivering weather records to a webhook
pub struct Webhook {
    client: Client,
    target: Option<String>,
}

impl Webhook {
    /// Returns a webhook struct ready for delivering records
    ///
    /// # Arguments
    ///
    /// * 'config' - webhook configuration, a url of None means delivery is skipped
    pub fn new(config: &WebhookParameters) -> Result<Webhook, WebhookError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Webhook {
            client,
            target: config.url.clone(),
        })
    }

    /// Returns the configured delivery target, if any
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Delivers a record if there is one and a target is configured.
    /// Nothing is returned, every outcome ends up in the log.
    ///
    /// # Arguments
    ///
    /// * 'record' - the record to deliver, None if the fetch gave nothing
    pub fn send_to_webhook(&self, record: Option<&WeatherRecord>) {
        let Some(record) = record else {
            info!("No weather data to send.");
            return;
        };

        let result = self.send(record);
        let level = outcome_level(&result);

        match result {
            Ok(status) => log!(level, "Successfully sent data to webhook. Status: {}", status.as_u16()),
            Err(WebhookError::NotConfigured) => log!(level, "Webhook URL is not configured. Skipping sending data."),
            Err(e) => {
                log!(level, "Error sending data to webhook: {}", e);
                if let WebhookError::Rejected(response) = &e {
                    error!("Webhook response data: {}", response.body);
                    error!("Webhook response status: {}", response.status);
                    error!("Webhook response headers: {}", response.headers_line());
                }
            }
        }
    }

    /// Posts the record as JSON to the configured target
    ///
    /// # Arguments
    ///
    /// * 'record' - the record to deliver
    pub fn send(&self, record: &WeatherRecord) -> Result<StatusCode, WebhookError> {
        let url = self.target.as_deref().ok_or(WebhookError::NotConfigured)?;
        info!("Sending data to webhook: {}", url);

        let response = self.client
            .post(url)
            .json(record)
            .send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(status);
        }

        let headers = response.headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect::<Vec<(String, String)>>();
        let body = response.text().unwrap_or_default();

        Err(WebhookError::Rejected(WebhookResponse {
            status: status.as_u16(),
            body,
            headers,
        }))
    }
}

/// Log level a delivery outcome is reported at. A missing target is a
/// configuration matter and only warrants a warning.
///
/// # Arguments
///
/// * 'result' - outcome of a delivery attempt
fn outcome_level(result: &Result<StatusCode, WebhookError>) -> Level {
    match result {
        Ok(_) => Level::Info,
        Err(WebhookError::NotConfigured) => Level::Warn,
        Err(_) => Level::Error,
    }
}

/// What the webhook answered when it refused a delivery
#[derive(Debug)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl WebhookResponse {
    fn headers_line(&self) -> String {
        self.headers.iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<String>>()
            .join(", ")
    }
}

impl fmt::Display for WebhookResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "status {}", self.status)
    }
}

/// Error depicting errors that occur while delivering to the webhook
///
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("NotConfigured: no webhook url set")]
    NotConfigured,
    #[error("NetworkError: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Rejected: {0}")]
    Rejected(WebhookResponse),
}

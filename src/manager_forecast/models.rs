use std::collections::HashMap;
use serde::Deserialize;
use serde_json::Value;

/// A forecast request for one coordinate returns an object, several coordinates an array
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ForecastDocument {
    Many(Vec<LocationForecast>),
    One(Box<LocationForecast>),
}

impl ForecastDocument {
    /// Returns the first location in the document, if any
    pub fn into_first(self) -> Option<LocationForecast> {
        match self {
            ForecastDocument::Many(v) => v.into_iter().next(),
            ForecastDocument::One(l) => Some(*l),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct LocationForecast {
    pub latitude: f64,
    pub longitude: f64,
    pub utc_offset_seconds: i64,
    pub timezone: String,
    pub timezone_abbreviation: String,
    pub current: Option<CurrentBlock>,
    pub daily: Option<DailyBlock>,
}

/// Current block, variables keyed by their api name
#[derive(Deserialize, Debug)]
pub struct CurrentBlock {
    pub time: i64,
    #[serde(flatten)]
    pub variables: HashMap<String, Value>,
}

/// Daily block, each variable is a series with one entry per forecast day
#[derive(Deserialize, Debug)]
pub struct DailyBlock {
    pub time: Vec<i64>,
    #[serde(flatten)]
    pub variables: HashMap<String, Value>,
}

/// Error body returned by the weather source on a rejected request
#[derive(Deserialize, Debug)]
pub struct ApiErrorBody {
    pub reason: String,
}

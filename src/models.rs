use serde::{Deserialize, Serialize};

/// Location metadata as echoed back by the weather source
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub timezone_abbreviation: String,
    pub utc_offset_seconds: i64,
}

/// Current conditions, time is ISO-8601 shifted to the location's local time
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Current {
    pub time: String,
    pub temperature2m: Option<f64>,
}

/// Forecast for the single requested day, time is the start of the forecast day
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Daily {
    pub time: String,
    pub temperature2m_max: Option<f64>,
    pub temperature2m_min: Option<f64>,
    pub precipitation_probability_max: Option<f64>,
    pub wind_gusts10m_max: Option<f64>,
    pub cloud_cover_mean: Option<f64>,
}

/// The record pushed to the webhook once per run
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct WeatherRecord {
    pub location: Location,
    pub current: Current,
    pub daily: Daily,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let record = WeatherRecord {
            location: Location {
                latitude: 37.17,
                longitude: -87.69,
                timezone: "America/Chicago".into(),
                timezone_abbreviation: "CDT".into(),
                utc_offset_seconds: -18000,
            },
            current: Current {
                time: "2024-06-10T05:00:00.000Z".into(),
                temperature2m: Some(72.5),
            },
            daily: Daily {
                time: "2024-06-10T00:00:00.000Z".into(),
                temperature2m_max: Some(88.0),
                temperature2m_min: Some(65.2),
                precipitation_probability_max: Some(40.0),
                wind_gusts10m_max: Some(22.3),
                cloud_cover_mean: Some(55.0),
            },
        };

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["location"]["timezoneAbbreviation"], "CDT");
        assert_eq!(json["location"]["utcOffsetSeconds"], -18000);
        assert_eq!(json["current"]["temperature2m"], 72.5);
        assert_eq!(json["daily"]["temperature2mMax"], 88.0);
        assert_eq!(json["daily"]["temperature2mMin"], 65.2);
        assert_eq!(json["daily"]["precipitationProbabilityMax"], 40.0);
        assert_eq!(json["daily"]["windGusts10mMax"], 22.3);
        assert_eq!(json["daily"]["cloudCoverMean"], 55.0);
    }
}

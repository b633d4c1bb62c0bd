//! Client-facing weather models

use serde::{Deserialize, Serialize};

/// Instantaneous conditions at request time
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Human-readable description of the weather code
    pub description: String,
    /// WMO weather code
    pub code: i64,
    /// Temperature in Celsius
    pub temperature: f64,
}

/// Aggregate for the current local day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DaySummary {
    pub description: String,
    pub code: i64,
    pub temperature_min: f64,
    pub temperature_max: f64,
}

/// Current conditions plus today's summary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherOverview {
    pub now: CurrentConditions,
    pub today: DaySummary,
}

/// One hourly forecast sample
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourSample {
    /// RFC 3339 instant in the location's UTC offset
    pub timestamp: String,
    pub description: String,
    pub code: i64,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Rain in mm
    pub precipitation_rain: f64,
    /// Snowfall in cm
    pub precipitation_snow: f64,
    /// Cloud cover percentage (0-100)
    pub cloud_cover: f64,
    /// Wind speed at 10 m in km/h
    pub wind_speed: f64,
}

/// Hourly samples sharing one local calendar date, in chronological order
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayBucket {
    /// Local calendar date (`YYYY-MM-DD`)
    pub timestamp: String,
    pub hours: Vec<HourSample>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyForecast {
    pub forecast: Vec<DayBucket>,
}

/// One daily forecast sample
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DaySample {
    /// RFC 3339 instant of local midnight
    pub timestamp: String,
    pub description: String,
    pub code: i64,
    /// Mean temperature in Celsius
    pub temperature_mean: f64,
    /// Rain sum in mm
    pub rain_sum: f64,
    /// Snowfall sum in cm
    pub snowfall_sum: f64,
    /// Maximum wind gust in km/h
    pub wind_gust_max: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyForecast {
    pub days: Vec<DaySample>,
}

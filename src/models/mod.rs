//! Data models for the weather gateway
//!
//! - Location: geocoding results, client-facing points and request bodies
//! - Weather: overview, hourly and daily forecast shapes

pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{Location, LocationRequest, NamedPoint, User, UserLocation};
pub use weather::{
    CurrentConditions, DailyForecast, DayBucket, DaySample, DaySummary, HourSample,
    HourlyForecast, WeatherOverview,
};

//! `weather-gateway` - weather forecasts and address search behind one HTTP API
//!
//! This library aggregates the Open-Meteo forecast API and the Nominatim
//! geocoder, normalizes their payloads into typed models and keeps one last
//! known location per user.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geocode;
pub mod models;
pub mod store;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use cache::PersistentCache;
pub use config::GatewayConfig;
pub use error::{MappingError, ServiceError};
pub use fetch::{Fetch, FetchError, HttpFetcher};
pub use geocode::GeocodeService;
pub use models::{Location, NamedPoint};
pub use store::{FjallLocationStore, LocationStore};
pub use weather::WeatherService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

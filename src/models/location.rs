//! Location models for address search and per-user storage

use serde::{Deserialize, Serialize};

/// Typed geocoding result
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Full display name as returned by the geocoder
    pub full_name: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// House number, `None` when the result is a street or an area
    pub house_number: Option<String>,
}

/// Minimal location shape shipped to clients and stored per user
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NamedPoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl NamedPoint {
    /// Create a new named point
    #[must_use]
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded_coordinates(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.lat * multiplier).round() / multiplier;
        let lon = (self.lon * multiplier).round() / multiplier;
        (lat, lon)
    }

    /// Generate a cache key for a forecast kind at this point
    #[must_use]
    pub fn cache_key(&self, kind: &str) -> String {
        let (lat, lon) = self.rounded_coordinates(2);
        format!("weather:{kind}:{lat:.2}:{lon:.2}")
    }
}

impl From<Location> for NamedPoint {
    fn from(location: Location) -> Self {
        Self {
            name: location.full_name,
            lat: location.lat,
            lon: location.lon,
        }
    }
}

/// Address search input
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    pub street: String,
    pub house_number: String,
    pub city: String,
    pub postal_code: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// Save request for a user's last known location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserLocation {
    pub username: String,
    pub location: NamedPoint,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub username: String,
}

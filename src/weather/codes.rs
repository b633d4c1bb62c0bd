//! WMO weather interpretation codes as returned by Open-Meteo

use crate::error::MappingError;

/// Every code the forecast provider documents, in ascending order
pub const KNOWN_CODES: [i64; 28] = [
    0, 1, 2, 3, 45, 48, 51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 71, 73, 75, 77, 80, 81, 82, 85,
    86, 95, 96, 99,
];

/// Convert a weather code to its human-readable description
pub fn describe(code: i64) -> Result<&'static str, MappingError> {
    let description = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light Drizzle",
        53 => "Moderate Drizzle",
        55 => "Dense Drizzle",
        56 => "Light Freezing Drizzle",
        57 => "Dense Freezing Drizzle",
        61 => "Slight Rain",
        63 => "Moderate Rain",
        65 => "Heavy Rain",
        66 => "Light Freezing Rain",
        67 => "Heavy Freezing Rain",
        71 => "Slight Snow fall",
        73 => "Moderate Snow fall",
        75 => "Heavy Snow fall",
        77 => "Snow grains",
        80 => "Slight Rain showers",
        81 => "Moderate Rain showers",
        82 => "Violent Rain showers",
        85 => "Slight Snow showers",
        86 => "Heavy Snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => return Err(MappingError::InvalidWeatherCode(code)),
    };
    Ok(description)
}

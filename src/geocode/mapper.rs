//! Nominatim search results to typed locations

use serde_json::{Map, Value};

use crate::error::MappingError;
use crate::models::{Location, NamedPoint};

/// Map a raw Nominatim `/search` payload to locations.
///
/// The payload must be a list. Any record that cannot be mapped fails the
/// whole batch.
pub fn map_raw_to_locations(raw: &Value) -> Result<Vec<Location>, MappingError> {
    let records = raw
        .as_array()
        .ok_or_else(|| MappingError::format("raw_data is not a list."))?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            map_record(record)
                .map_err(|cause| MappingError::format(format!("record {index}: {cause}")))
        })
        .collect()
}

/// Project locations onto the client shape, keeping order
#[must_use]
pub fn to_named_points(locations: Vec<Location>) -> Vec<NamedPoint> {
    locations.into_iter().map(NamedPoint::from).collect()
}

fn map_record(record: &Value) -> Result<Location, String> {
    let record = record
        .as_object()
        .ok_or_else(|| format!("expected an object, got {record}"))?;

    let full_name = record
        .get("display_name")
        .and_then(Value::as_str)
        .ok_or("missing display_name")?
        .to_string();

    Ok(Location {
        full_name,
        lat: coordinate(record, "lat")?,
        lon: coordinate(record, "lon")?,
        house_number: house_number(record)?,
    })
}

/// Nominatim sends coordinates as strings; plain numbers are accepted too
fn coordinate(record: &Map<String, Value>, field: &str) -> Result<f64, String> {
    match record.get(field) {
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("{field} '{text}' is not a number: {e}")),
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| format!("{field} {number} is out of range")),
        Some(other) => Err(format!("{field} has unexpected value {other}")),
        None => Err(format!("missing {field}")),
    }
}

fn house_number(record: &Map<String, Value>) -> Result<Option<String>, String> {
    let address = match record.get("address") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(address)) => address,
        Some(other) => return Err(format!("address has unexpected value {other}")),
    };

    match address.get("house_number") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(number)) if number.is_empty() => Ok(None),
        Some(Value::String(number)) => Ok(Some(number.clone())),
        Some(other) => Err(format!("house_number has unexpected value {other}")),
    }
}

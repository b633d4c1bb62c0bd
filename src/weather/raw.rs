//! Open-Meteo forecast payload and named field access
//!
//! Requests are made with `timeformat=unixtime`, so every section carries a
//! `time` array of unix seconds next to one array per requested variable.
//! Variables are looked up through [`FieldSet`]s: ordered lists of variable
//! names that produce the request parameter and bind the matching columns.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::MappingError;
use crate::weather::bucket::SeriesWindow;

/// Forecast response body
#[derive(Debug, Clone, Deserialize)]
pub struct RawForecast {
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub current: Option<RawCurrent>,
    pub hourly: Option<RawSeries>,
    pub daily: Option<RawSeries>,
}

/// `current` section: one scalar per variable
#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrent {
    #[serde(flatten)]
    pub values: HashMap<String, Value>,
}

/// `hourly` / `daily` section: parallel arrays indexed like `time`
#[derive(Debug, Clone, Deserialize)]
pub struct RawSeries {
    pub time: Vec<i64>,
    #[serde(flatten)]
    pub values: HashMap<String, Value>,
}

impl RawForecast {
    /// Decode a fetched payload
    pub fn from_value(value: Value) -> Result<Self, MappingError> {
        serde_json::from_value(value)
            .map_err(|e| MappingError::format(format!("forecast payload: {e}")))
    }

    pub fn current(&self) -> Result<&RawCurrent, MappingError> {
        self.current
            .as_ref()
            .ok_or_else(|| MappingError::format("forecast payload: missing current section"))
    }

    pub fn hourly(&self) -> Result<&RawSeries, MappingError> {
        self.hourly
            .as_ref()
            .ok_or_else(|| MappingError::format("forecast payload: missing hourly section"))
    }

    pub fn daily(&self) -> Result<&RawSeries, MappingError> {
        self.daily
            .as_ref()
            .ok_or_else(|| MappingError::format("forecast payload: missing daily section"))
    }
}

impl RawSeries {
    /// Number of samples in the section
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Window covering exactly `len()` samples at a fixed cadence
    #[must_use]
    pub fn window(&self, interval: i64, utc_offset_seconds: i32) -> SeriesWindow {
        let start = self.time.first().copied().unwrap_or_default();
        let samples = i64::try_from(self.len()).unwrap_or(i64::MAX);
        SeriesWindow {
            start,
            end: start.saturating_add(samples.saturating_mul(interval)),
            interval,
            utc_offset_seconds,
        }
    }
}

/// Ordered list of upstream variable names read by one mapper
#[derive(Debug, Clone, Copy)]
pub struct FieldSet<const N: usize> {
    names: [&'static str; N],
}

impl<const N: usize> FieldSet<N> {
    #[must_use]
    pub const fn new(names: [&'static str; N]) -> Self {
        Self { names }
    }

    /// Comma separated variable list for the request query
    #[must_use]
    pub fn query_value(&self) -> String {
        self.names.join(",")
    }

    /// Bind every field to its column, in declaration order
    pub fn columns<'a>(&self, series: &'a RawSeries) -> Result<[Column<'a>; N], MappingError> {
        let columns = self
            .names
            .iter()
            .copied()
            .map(|name| Column::bind(name, series))
            .collect::<Result<Vec<_>, _>>()?;
        columns
            .try_into()
            .map_err(|_| MappingError::format("field count mismatch"))
    }

    /// Bind every field to its scalar reading, in declaration order
    pub fn readings<'a>(&self, current: &'a RawCurrent) -> Result<[Reading<'a>; N], MappingError> {
        let readings = self
            .names
            .iter()
            .copied()
            .map(|name| {
                current
                    .values
                    .get(name)
                    .map(|value| Reading { name, value })
                    .ok_or_else(|| MappingError::format(format!("missing current variable {name}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        readings
            .try_into()
            .map_err(|_| MappingError::format("field count mismatch"))
    }
}

/// One variable array of a series section
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    name: &'static str,
    values: &'a [Value],
}

impl<'a> Column<'a> {
    fn bind(name: &'static str, series: &'a RawSeries) -> Result<Self, MappingError> {
        let values = series
            .values
            .get(name)
            .ok_or_else(|| MappingError::format(format!("missing variable {name}")))?
            .as_array()
            .ok_or_else(|| MappingError::format(format!("variable {name} is not an array")))?;

        if values.len() != series.len() {
            return Err(MappingError::format(format!(
                "variable {name} has {} values for {} timestamps",
                values.len(),
                series.len()
            )));
        }

        Ok(Self { name, values })
    }

    /// Measurement at `index` as a float
    pub fn number(&self, index: usize) -> Result<f64, MappingError> {
        as_number(self.name, self.at(index)?)
    }

    /// Weather code at `index`
    pub fn code(&self, index: usize) -> Result<i64, MappingError> {
        as_code(self.name, self.at(index)?)
    }

    fn at(&self, index: usize) -> Result<&'a Value, MappingError> {
        self.values.get(index).ok_or_else(|| {
            MappingError::format(format!("variable {} has no value at {index}", self.name))
        })
    }
}

/// One scalar variable of the `current` section
#[derive(Debug, Clone, Copy)]
pub struct Reading<'a> {
    name: &'static str,
    value: &'a Value,
}

impl Reading<'_> {
    pub fn number(&self) -> Result<f64, MappingError> {
        as_number(self.name, self.value)
    }

    pub fn code(&self) -> Result<i64, MappingError> {
        as_code(self.name, self.value)
    }
}

fn as_number(name: &str, value: &Value) -> Result<f64, MappingError> {
    value
        .as_f64()
        .ok_or_else(|| MappingError::format(format!("{name} value {value} is not a number")))
}

fn as_code(name: &str, value: &Value) -> Result<i64, MappingError> {
    if let Some(code) = value.as_i64() {
        return Ok(code);
    }
    let number = as_number(name, value)?;
    if number.fract() != 0.0 {
        return Err(MappingError::format(format!(
            "{name} value {value} is not an integer code"
        )));
    }
    Ok(number as i64)
}

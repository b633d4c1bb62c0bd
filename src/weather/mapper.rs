//! Open-Meteo payloads to client-facing weather models

use crate::error::MappingError;
use crate::models::{
    CurrentConditions, DailyForecast, DayBucket, DaySample, DaySummary, HourSample,
    HourlyForecast, WeatherOverview,
};
use crate::weather::bucket::bucket_series;
use crate::weather::codes::describe;
use crate::weather::raw::{FieldSet, RawForecast};

/// Seconds between hourly samples
pub const HOURLY_INTERVAL: i64 = 3600;
/// Seconds between daily samples
pub const DAILY_INTERVAL: i64 = 86_400;

pub const OVERVIEW_CURRENT_FIELDS: FieldSet<2> =
    FieldSet::new(["weather_code", "temperature_2m"]);
pub const OVERVIEW_DAILY_FIELDS: FieldSet<3> =
    FieldSet::new(["weather_code", "temperature_2m_min", "temperature_2m_max"]);
pub const HOURLY_FIELDS: FieldSet<6> = FieldSet::new([
    "weather_code",
    "temperature_2m",
    "rain",
    "snowfall",
    "cloud_cover",
    "wind_speed_10m",
]);
pub const DAILY_FIELDS: FieldSet<5> = FieldSet::new([
    "weather_code",
    "temperature_2m_mean",
    "rain_sum",
    "snowfall_sum",
    "wind_gusts_10m_max",
]);

/// Current conditions and today's summary
pub fn map_overview(raw: &RawForecast) -> Result<WeatherOverview, MappingError> {
    let [current_code, temperature] = OVERVIEW_CURRENT_FIELDS.readings(raw.current()?)?;
    let daily = raw.daily()?;
    if daily.is_empty() {
        return Err(MappingError::format("forecast payload: daily section has no days"));
    }
    let [today_code, temperature_min, temperature_max] = OVERVIEW_DAILY_FIELDS.columns(daily)?;

    let now_code = current_code.code()?;
    let today_code = today_code.code(0)?;

    Ok(WeatherOverview {
        now: CurrentConditions {
            description: describe(now_code)?.to_string(),
            code: now_code,
            temperature: temperature.number()?,
        },
        today: DaySummary {
            description: describe(today_code)?.to_string(),
            code: today_code,
            temperature_min: temperature_min.number(0)?,
            temperature_max: temperature_max.number(0)?,
        },
    })
}

/// Hourly samples grouped into local calendar days
pub fn map_hourly(raw: &RawForecast) -> Result<HourlyForecast, MappingError> {
    let series = raw.hourly()?;
    let [code, temperature, rain, snowfall, cloud_cover, wind_speed] =
        HOURLY_FIELDS.columns(series)?;
    let window = series.window(HOURLY_INTERVAL, raw.utc_offset_seconds);

    let days = bucket_series(&window, |i, timestamp| {
        let code = code.code(i)?;
        Ok(HourSample {
            timestamp: timestamp.to_rfc3339(),
            description: describe(code)?.to_string(),
            code,
            temperature: temperature.number(i)?,
            precipitation_rain: rain.number(i)?,
            precipitation_snow: snowfall.number(i)?,
            cloud_cover: cloud_cover.number(i)?,
            wind_speed: wind_speed.number(i)?,
        })
    })?;

    let forecast = days
        .into_iter()
        .map(|day| DayBucket {
            timestamp: day.date.to_string(),
            hours: day.items,
        })
        .collect();

    Ok(HourlyForecast { forecast })
}

/// One sample per forecast day.
///
/// Samples still pass through the day grouping; at a one day cadence every
/// group holds exactly one sample.
pub fn map_daily(raw: &RawForecast) -> Result<DailyForecast, MappingError> {
    let series = raw.daily()?;
    let [code, temperature_mean, rain_sum, snowfall_sum, wind_gust_max] =
        DAILY_FIELDS.columns(series)?;
    let window = series.window(DAILY_INTERVAL, raw.utc_offset_seconds);

    let days = bucket_series(&window, |i, timestamp| {
        let code = code.code(i)?;
        Ok(DaySample {
            timestamp: timestamp.to_rfc3339(),
            description: describe(code)?.to_string(),
            code,
            temperature_mean: temperature_mean.number(i)?,
            rain_sum: rain_sum.number(i)?,
            snowfall_sum: snowfall_sum.number(i)?,
            wind_gust_max: wind_gust_max.number(i)?,
        })
    })?;

    Ok(DailyForecast {
        days: days.into_iter().flat_map(|day| day.items).collect(),
    })
}

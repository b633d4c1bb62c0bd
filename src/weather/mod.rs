//! Weather forecasts from Open-Meteo
//!
//! [`WeatherService`] fetches one forecast shape per request, maps it with the
//! pure functions in [`mapper`] and keeps mapped results in the optional
//! persistent cache.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::cache::{PersistentCache, ttl_with_jitter};
use crate::error::{MappingError, ServiceError};
use crate::fetch::{Fetch, Params, classify_fetch_error};
use crate::models::{DailyForecast, HourlyForecast, NamedPoint, WeatherOverview};
use raw::RawForecast;

pub mod bucket;
pub mod codes;
pub mod mapper;
pub mod raw;

const WEATHER_API: &str = "Weather";

/// The three forecast shapes served to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastKind {
    Overview,
    Hourly,
    Daily,
}

impl ForecastKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ForecastKind::Overview => "overview",
            ForecastKind::Hourly => "hourly",
            ForecastKind::Daily => "daily",
        }
    }

    /// Upstream query for this shape at `lat`/`lon`
    #[must_use]
    pub fn params(self, lat: f64, lon: f64) -> Params {
        let mut params = vec![
            ("latitude".to_string(), lat.to_string()),
            ("longitude".to_string(), lon.to_string()),
        ];
        match self {
            ForecastKind::Overview => {
                params.push(("current".into(), mapper::OVERVIEW_CURRENT_FIELDS.query_value()));
                params.push(("daily".into(), mapper::OVERVIEW_DAILY_FIELDS.query_value()));
                params.push(("forecast_days".into(), "1".into()));
            }
            ForecastKind::Hourly => {
                params.push(("hourly".into(), mapper::HOURLY_FIELDS.query_value()));
            }
            ForecastKind::Daily => {
                params.push(("daily".into(), mapper::DAILY_FIELDS.query_value()));
            }
        }
        params.push(("timezone".into(), "auto".into()));
        params.push(("timeformat".into(), "unixtime".into()));
        params
    }
}

/// How long mapped forecasts stay cached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    pub overview: Duration,
    pub hourly: Duration,
    pub daily: Duration,
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self {
            overview: Duration::from_secs(30 * 60),
            hourly: Duration::from_secs(50 * 60),
            daily: Duration::from_secs(30 * 60),
        }
    }
}

impl CacheTtl {
    #[must_use]
    pub fn for_kind(&self, kind: ForecastKind) -> Duration {
        match kind {
            ForecastKind::Overview => self.overview,
            ForecastKind::Hourly => self.hourly,
            ForecastKind::Daily => self.daily,
        }
    }
}

pub struct WeatherService {
    fetcher: Arc<dyn Fetch>,
    forecast_url: String,
    cache: Option<PersistentCache>,
    ttl: CacheTtl,
}

impl WeatherService {
    /// Service against the API rooted at `base_url` (e.g. `https://api.open-meteo.com/v1`)
    pub fn new(fetcher: Arc<dyn Fetch>, base_url: &str) -> Self {
        Self {
            fetcher,
            forecast_url: format!("{}/forecast", base_url.trim_end_matches('/')),
            cache: None,
            ttl: CacheTtl::default(),
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: PersistentCache, ttl: CacheTtl) -> Self {
        self.cache = Some(cache);
        self.ttl = ttl;
        self
    }

    #[instrument(skip(self), fields(lat = point.lat, lon = point.lon))]
    pub async fn overview(&self, point: &NamedPoint) -> Result<WeatherOverview, ServiceError> {
        self.forecast(ForecastKind::Overview, point, mapper::map_overview)
            .await
    }

    #[instrument(skip(self), fields(lat = point.lat, lon = point.lon))]
    pub async fn hourly(&self, point: &NamedPoint) -> Result<HourlyForecast, ServiceError> {
        self.forecast(ForecastKind::Hourly, point, mapper::map_hourly)
            .await
    }

    #[instrument(skip(self), fields(lat = point.lat, lon = point.lon))]
    pub async fn daily(&self, point: &NamedPoint) -> Result<DailyForecast, ServiceError> {
        self.forecast(ForecastKind::Daily, point, mapper::map_daily)
            .await
    }

    async fn forecast<T, F>(
        &self,
        kind: ForecastKind,
        point: &NamedPoint,
        map: F,
    ) -> Result<T, ServiceError>
    where
        T: Serialize + DeserializeOwned + Clone + Debug + Send + 'static,
        F: FnOnce(&RawForecast) -> Result<T, MappingError>,
    {
        let key = point.cache_key(kind.as_str());

        if let Some(cache) = &self.cache {
            match cache.get::<T>(&key).await {
                Ok(Some(hit)) => {
                    debug!("Serving {} forecast from cache", kind.as_str());
                    return Ok(hit);
                }
                Ok(None) => {}
                Err(e) => warn!("Forecast cache read failed: {}", e),
            }
        }

        let params = kind.params(point.lat, point.lon);
        let value = self
            .fetcher
            .fetch(&self.forecast_url, &params)
            .await
            .map_err(|e| classify_fetch_error(WEATHER_API, e))?;
        let mapped = map(&RawForecast::from_value(value)?)?;

        if let Some(cache) = &self.cache {
            let ttl = ttl_with_jitter(self.ttl.for_kind(kind));
            if let Err(e) = cache.put(&key, mapped.clone(), ttl).await {
                warn!("Forecast cache write failed: {}", e);
            }
        }

        Ok(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct StubFetch {
        response: Result<Value, FetchError>,
        calls: Mutex<Vec<(String, Params)>>,
    }

    impl StubFetch {
        fn new(response: Result<Value, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Fetch for StubFetch {
        async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), params.to_vec()));
            self.response.clone()
        }
    }

    fn overview_body() -> Value {
        json!({
            "utc_offset_seconds": 0,
            "current": { "weather_code": 0, "temperature_2m": 21.0 },
            "daily": {
                "time": [1_609_459_200],
                "weather_code": [1],
                "temperature_2m_min": [12.0],
                "temperature_2m_max": [24.0]
            }
        })
    }

    fn point() -> NamedPoint {
        NamedPoint::new("Home", 46.6, 13.8)
    }

    fn param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn test_overview_params() {
        let params = ForecastKind::Overview.params(46.6, 13.8);
        assert_eq!(param(&params, "latitude"), Some("46.6"));
        assert_eq!(param(&params, "longitude"), Some("13.8"));
        assert_eq!(param(&params, "current"), Some("weather_code,temperature_2m"));
        assert_eq!(
            param(&params, "daily"),
            Some("weather_code,temperature_2m_min,temperature_2m_max")
        );
        assert_eq!(param(&params, "forecast_days"), Some("1"));
        assert_eq!(param(&params, "timezone"), Some("auto"));
    }

    #[test]
    fn test_hourly_and_daily_params() {
        let hourly = ForecastKind::Hourly.params(1.0, 2.0);
        assert_eq!(
            param(&hourly, "hourly"),
            Some("weather_code,temperature_2m,rain,snowfall,cloud_cover,wind_speed_10m")
        );
        assert_eq!(param(&hourly, "timezone"), Some("auto"));

        let daily = ForecastKind::Daily.params(1.0, 2.0);
        assert_eq!(
            param(&daily, "daily"),
            Some("weather_code,temperature_2m_mean,rain_sum,snowfall_sum,wind_gusts_10m_max")
        );
        assert_eq!(param(&daily, "timezone"), Some("auto"));
        assert_eq!(param(&daily, "forecast_days"), None);
    }

    #[tokio::test]
    async fn test_overview_is_fetched_and_mapped() {
        let stub = StubFetch::new(Ok(overview_body()));
        let service = WeatherService::new(stub.clone(), "https://api.open-meteo.com/v1/");

        let overview = service.overview(&point()).await.unwrap();
        assert_eq!(overview.now.description, "Clear sky");
        assert_eq!(overview.today.temperature_max, 24.0);

        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls[0].0, "https://api.open-meteo.com/v1/forecast");
    }

    #[tokio::test]
    async fn test_upstream_status_is_external_api_error() {
        let stub = StubFetch::new(Err(FetchError::Status(502)));
        let service = WeatherService::new(stub, "http://weather.test");

        let err = service.hourly(&point()).await.unwrap_err();
        assert!(matches!(err, ServiceError::ExternalApi { .. }));
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_mapping_error() {
        let stub = StubFetch::new(Ok(json!({ "utc_offset_seconds": 0 })));
        let service = WeatherService::new(stub, "http://weather.test");

        let err = service.daily(&point()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Mapping(_)));
    }

    #[tokio::test]
    async fn test_cached_forecast_skips_upstream() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let stub = StubFetch::new(Ok(overview_body()));
        let service = WeatherService::new(stub.clone(), "http://weather.test")
            .with_cache(cache, CacheTtl::default());

        let first = service.overview(&point()).await.unwrap();
        let second = service.overview(&point()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(stub.call_count(), 1);
    }
}

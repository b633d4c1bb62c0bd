//! Configuration management for the weather gateway
//!
//! Handles loading configuration from a TOML file and environment variables,
//! and provides validation for all configuration settings.

use crate::fetch::HttpSettings;
use crate::geocode::SearchDefaults;
use crate::weather::CacheTtl;
use anyhow::{Context, Result, bail};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "weather-gateway.toml";
const ENV_PREFIX: &str = "WEATHER_GATEWAY";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub weather: WeatherConfig,
    pub geocode: GeocodeConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for handling one request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Forecast API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Address search API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    #[serde(default = "default_geocode_base_url")]
    pub base_url: String,
    /// Nominatim rejects requests without an identifying user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Local database location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

/// Forecast cache lifetimes in minutes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_overview_ttl")]
    pub overview_ttl_minutes: u64,
    #[serde(default = "default_hourly_ttl")]
    pub hourly_ttl_minutes: u64,
    #[serde(default = "default_daily_ttl")]
    pub daily_ttl_minutes: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    60
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_geocode_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("weather-gateway/{}", env!("CARGO_PKG_VERSION"))
}

fn default_result_limit() -> u32 {
    5
}

fn default_upstream_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    5
}

fn default_storage_path() -> String {
    "data".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_overview_ttl() -> u64 {
    30
}

fn default_hourly_ttl() -> u64 {
    50
}

fn default_daily_ttl() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_upstream_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocode_base_url(),
            user_agent: default_user_agent(),
            result_limit: default_result_limit(),
            timeout_seconds: default_upstream_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            overview_ttl_minutes: default_overview_ttl(),
            hourly_ttl_minutes: default_hourly_ttl(),
            daily_ttl_minutes: default_daily_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from the default file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut builder = Config::builder();
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHER_GATEWAY_SERVER__PORT=9000 overrides server.port
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: GatewayConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Replace empty or zero values with their defaults
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_upstream_timeout();
        }
        if self.geocode.base_url.is_empty() {
            self.geocode.base_url = default_geocode_base_url();
        }
        if self.geocode.user_agent.is_empty() {
            self.geocode.user_agent = default_user_agent();
        }
        if self.geocode.result_limit == 0 {
            self.geocode.result_limit = default_result_limit();
        }
        if self.geocode.timeout_seconds == 0 {
            self.geocode.timeout_seconds = default_upstream_timeout();
        }
        if self.storage.path.is_empty() {
            self.storage.path = default_storage_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 || self.geocode.timeout_seconds > 300 {
            bail!("Upstream timeout cannot exceed 300 seconds");
        }

        if self.weather.max_retries > 10 || self.geocode.max_retries > 10 {
            bail!("Upstream max retries cannot exceed 10");
        }

        if self.geocode.result_limit > 50 {
            bail!("Geocode result limit cannot exceed 50");
        }

        let ttls = [
            self.cache.overview_ttl_minutes,
            self.cache.hourly_ttl_minutes,
            self.cache.daily_ttl_minutes,
        ];
        if ttls.iter().any(|ttl| *ttl > 24 * 60) {
            bail!("Cache TTL cannot exceed 1440 minutes (1 day)");
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            );
        }

        let valid_log_formats = ["pretty", "compact"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            );
        }

        for (name, url) in [
            ("Weather", &self.weather.base_url),
            ("Geocode", &self.geocode.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("{name} API base URL must be a valid HTTP or HTTPS URL");
            }
        }

        Ok(())
    }

    /// Client settings for the forecast API
    #[must_use]
    pub fn weather_http(&self) -> HttpSettings {
        HttpSettings {
            timeout: Duration::from_secs(self.weather.timeout_seconds),
            max_retries: self.weather.max_retries,
            user_agent: self.geocode.user_agent.clone(),
        }
    }

    /// Client settings for the address search API
    #[must_use]
    pub fn geocode_http(&self) -> HttpSettings {
        HttpSettings {
            timeout: Duration::from_secs(self.geocode.timeout_seconds),
            max_retries: self.geocode.max_retries,
            user_agent: self.geocode.user_agent.clone(),
        }
    }

    #[must_use]
    pub fn search_defaults(&self) -> SearchDefaults {
        SearchDefaults {
            limit: self.geocode.result_limit,
            ..SearchDefaults::default()
        }
    }

    #[must_use]
    pub fn cache_ttl(&self) -> CacheTtl {
        CacheTtl {
            overview: Duration::from_secs(self.cache.overview_ttl_minutes * 60),
            hourly: Duration::from_secs(self.cache.hourly_ttl_minutes * 60),
            daily: Duration::from_secs(self.cache.daily_ttl_minutes * 60),
        }
    }

    /// Directory holding the forecast cache database
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        Path::new(&self.storage.path).join("cache")
    }

    /// Directory holding the user location database
    #[must_use]
    pub fn locations_dir(&self) -> PathBuf {
        Path::new(&self.storage.path).join("locations")
    }
}

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use weather_gateway::{
    AppState, FjallLocationStore, GatewayConfig, GeocodeService, HttpFetcher, PersistentCache,
    WeatherService, config::LoggingConfig, web,
};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("weather_gateway={}", logging.level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "compact" {
        builder.compact().init();
    } else {
        builder.pretty().init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::load()?;
    init_tracing(&config.logging);

    let weather_fetcher = Arc::new(HttpFetcher::new(&config.weather_http())?);
    let geocode_fetcher = Arc::new(HttpFetcher::new(&config.geocode_http())?);

    let mut weather = WeatherService::new(weather_fetcher, &config.weather.base_url);
    if config.cache.enabled {
        let cache = PersistentCache::open(config.cache_dir())
            .with_context(|| "Failed to open forecast cache")?;
        weather = weather.with_cache(cache, config.cache_ttl());
    }

    let geocode = GeocodeService::new(
        geocode_fetcher,
        &config.geocode.base_url,
        config.search_defaults(),
    );

    let locations = FjallLocationStore::open(config.locations_dir())
        .with_context(|| "Failed to open location store")?;

    let state = AppState {
        weather: Arc::new(weather),
        geocode: Arc::new(geocode),
        locations: Arc::new(locations),
    };

    tracing::info!("Starting weather gateway {}", weather_gateway::VERSION);
    web::run(state, &config.server).await
}

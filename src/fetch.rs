//! Outbound HTTP fetching for the upstream APIs
//!
//! Both upstreams are reached through the [`Fetch`] trait so services can be
//! handed any implementation. [`HttpFetcher`] is the production one: a
//! `reqwest` client wrapped in transient-error retry middleware. Retries live
//! only here; services see the final outcome.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::ServiceError;

/// Why an upstream call did not produce a structured payload
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("invalid payload: {0}")]
    Payload(String),
}

/// Query parameters in request order
pub type Params = Vec<(String, String)>;

#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET `url` with `params` and decode the JSON body
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<Value, FetchError>;
}

/// Client settings for one upstream
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub max_retries: u32,
    pub user_agent: String,
}

/// Retrying HTTP implementation of [`Fetch`]
#[derive(Clone)]
pub struct HttpFetcher {
    client: ClientWithMiddleware,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[instrument(name = "upstream_fetch", level = "debug", skip(self, params))]
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
        let url = Url::parse_with_params(url, params)
            .map_err(|e| FetchError::Transport(format!("invalid url {url}: {e}")))?;
        debug!("Sending request to {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream answered with status {}", status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| FetchError::Payload(e.to_string()))
    }
}

/// Translate a fetch failure at the boundary of the upstream named `api`
#[must_use]
pub fn classify_fetch_error(api: &str, error: FetchError) -> ServiceError {
    match error {
        FetchError::Status(status) => {
            ServiceError::external_api(format!("{api} API returned {status}"))
        }
        FetchError::Transport(cause) => {
            debug!("Transport failure towards {} API: {}", api, cause);
            ServiceError::external_api(format!("Failed to reach {api} API"))
        }
        FetchError::Payload(cause) => {
            debug!("Malformed payload from {} API: {}", api, cause);
            ServiceError::external_api(format!("{api} API returned an invalid payload"))
        }
    }
}

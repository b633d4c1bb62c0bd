//! Last known location per user
//!
//! One entry per username, overwritten on every save. Locations are stored as
//! JSON so the blob stays readable outside the service.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use fjall::Keyspace;
use tokio::task;
use tracing::{debug, instrument};

use crate::error::ServiceError;
use crate::models::NamedPoint;

#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Replace the stored location of `username`
    async fn save(&self, username: &str, location: &NamedPoint) -> Result<(), ServiceError>;

    /// Stored location of `username`, `None` when nothing was saved yet
    async fn fetch(&self, username: &str) -> Result<Option<NamedPoint>, ServiceError>;
}

/// [`LocationStore`] backed by a fjall keyspace keyed by username
#[derive(Clone)]
pub struct FjallLocationStore {
    locations: Keyspace,
}

impl FjallLocationStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let locations = db.keyspace("locations", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self { locations })
    }
}

fn storage_error(err: impl std::fmt::Display) -> ServiceError {
    ServiceError::storage(err.to_string())
}

#[async_trait]
impl LocationStore for FjallLocationStore {
    #[instrument(name = "save_location", level = "debug", skip(self, location))]
    async fn save(&self, username: &str, location: &NamedPoint) -> Result<(), ServiceError> {
        let json = serde_json::to_vec(location).map_err(storage_error)?;
        let key = username.as_bytes().to_vec();
        let locations = self.locations.clone();

        task::spawn_blocking(move || locations.insert(key, json))
            .await
            .map_err(storage_error)?
            .map_err(storage_error)?;

        debug!("Stored location for user");
        Ok(())
    }

    #[instrument(name = "fetch_location", level = "debug", skip(self))]
    async fn fetch(&self, username: &str) -> Result<Option<NamedPoint>, ServiceError> {
        let key = username.as_bytes().to_vec();
        let locations = self.locations.clone();

        let bytes = task::spawn_blocking(move || {
            locations.get(key).map(|value| value.map(|v| v.to_vec()))
        })
        .await
        .map_err(storage_error)?
        .map_err(storage_error)?;

        bytes
            .map(|bytes| serde_json::from_slice(&bytes).map_err(storage_error))
            .transpose()
    }
}

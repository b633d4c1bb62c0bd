//! Error types and handling for the weather gateway

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An upstream payload was received but does not have the expected shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    /// Weather condition code outside the known table
    #[error("Unexpected weather code: {0}")]
    InvalidWeatherCode(i64),

    /// Missing fields, wrong types or malformed values
    #[error("Invalid raw_data format: {0}")]
    InvalidFormat(String),
}

impl MappingError {
    /// Create a new format error
    pub fn format<S: Into<String>>(message: S) -> Self {
        Self::InvalidFormat(message.into())
    }
}

/// Main error type surfaced by the services to the HTTP boundary
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Upstream unreachable, non-success status or unparseable payload
    #[error("{message}")]
    ExternalApi { message: String },

    /// Upstream payload violates the expected contract
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The location store could not complete a read or write
    #[error("{message}")]
    Storage { message: String },
}

impl ServiceError {
    /// Create a new external API error
    pub fn external_api<S: Into<String>>(message: S) -> Self {
        Self::ExternalApi {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// HTTP status the boundary layer answers with
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ExternalApi { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Mapping(_) | ServiceError::Storage { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ServiceError::ExternalApi { message } => {
                tracing::warn!("External API failure: {}", message);
                json!({ "error": "ExternalApiError", "message": message })
            }
            ServiceError::Mapping(err) => {
                tracing::error!("Mapping failure: {}", err);
                json!({ "error": "MappingError", "message": err.to_string() })
            }
            ServiceError::Storage { message } => {
                tracing::error!("Storage failure: {}", message);
                json!({ "detail": "A database error occurred", "error": message })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let api_err = ServiceError::external_api("Geocoding API returned 500");
        assert!(matches!(api_err, ServiceError::ExternalApi { .. }));

        let storage_err = ServiceError::storage("disk full");
        assert!(matches!(storage_err, ServiceError::Storage { .. }));

        let mapping_err: ServiceError = MappingError::InvalidWeatherCode(42).into();
        assert!(matches!(
            mapping_err,
            ServiceError::Mapping(MappingError::InvalidWeatherCode(42))
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::external_api("down").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServiceError::from(MappingError::format("bad")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::storage("locked").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_mapping_messages() {
        assert_eq!(
            MappingError::InvalidWeatherCode(4).to_string(),
            "Unexpected weather code: 4"
        );
        let err = ServiceError::from(MappingError::format("raw_data is not a list."));
        assert!(err.to_string().contains("raw_data is not a list"));
    }
}

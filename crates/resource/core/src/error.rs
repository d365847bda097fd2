//! Error types for resource-core

use crate::record::RecordId;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage collaborator errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other integrity constraint violated
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Record vanished between lookup and write
    #[error("Missing record: {kind}/{id}")]
    Missing { kind: &'static str, id: RecordId },

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error
    #[error("Query error: {0}")]
    Query(String),

    /// Stored data could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Comparable class of a [`StoreError`].
///
/// A resource may designate one kind as acceptable: creates failing with that
/// kind answer `422` instead of faulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorKind {
    Conflict,
    Constraint,
    Missing,
    Connection,
    Query,
    Serialization,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Conflict(_) => StoreErrorKind::Conflict,
            StoreError::Constraint(_) => StoreErrorKind::Constraint,
            StoreError::Missing { .. } => StoreErrorKind::Missing,
            StoreError::Connection(_) => StoreErrorKind::Connection,
            StoreError::Query(_) => StoreErrorKind::Query,
            StoreError::Serialization(_) => StoreErrorKind::Serialization,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Expected early endings of a pipeline, answered directly to the client.
#[derive(Debug, Error)]
pub enum Rejection {
    /// Lookup failed: malformed identifier or no such record
    #[error("Not found")]
    NotFound,

    /// Caller does not own the record
    #[error("Unauthorized")]
    Unauthorized,

    /// Body did not bind, or storage refused it with an acceptable error
    #[error("{0}")]
    Unprocessable(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::NotFound => StatusCode::NOT_FOUND.into_response(),
            Rejection::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Rejection::Unprocessable(error) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorResponse { error })).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            StoreError::Conflict("title".into()).kind(),
            StoreErrorKind::Conflict
        );
        assert_eq!(
            StoreError::Missing { kind: "notes", id: 4 }.kind(),
            StoreErrorKind::Missing
        );
        assert_ne!(
            StoreError::Query("syntax".into()).kind(),
            StoreErrorKind::Conflict
        );
    }

    #[test]
    fn test_kind_parses_from_config_strings() {
        let kind: StoreErrorKind = serde_json::from_str("\"conflict\"").unwrap();
        assert_eq!(kind, StoreErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_rejection_status_codes() {
        assert_eq!(
            Rejection::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Rejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );

        let response = Rejection::Unprocessable("couldn't bind resource".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"error":"couldn't bind resource"}"#);
    }

    #[tokio::test]
    async fn test_not_found_has_empty_body() {
        let response = Rejection::NotFound.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}

//! Error types for resource-daemon
//!
//! Request-time failures never reach this module: expected outcomes are
//! answered by the pipelines themselves, and faults become a bare `500` at
//! the request boundary.

use resource_core::StoreError;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for DaemonError {
    fn from(err: config::ConfigError) -> Self {
        DaemonError::Config(err.to_string())
    }
}

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_convert() {
        let err: DaemonError = StoreError::Connection("refused".to_string()).into();
        assert!(matches!(err, DaemonError::Storage(_)));
        assert_eq!(err.to_string(), "Storage error: Connection error: refused");
    }
}

//! Unified error handling for the daily-shuffle crate
//!
//! Every fallible operation in the library returns [`Result`], whose error
//! type is the [`Error`] enum below. Store failures are never recovered
//! locally: they propagate to the trigger that invoked the operation
//! (the HTTP handler or the scheduled publisher).
//!
//! # Usage
//!
//! ```rust,ignore
//! use daily_shuffle::error::{Error, ErrorCategory};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         tracing::warn!(error = %err, "Transient failure, next tick will retry");
//!     } else {
//!         tracing::error!(error = %err, category = ?err.category(), "Fatal error");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Backing store and I/O errors
    Storage,
    /// Invalid arguments and corrupt data
    Validation,
    /// Configuration errors
    Config,
}

impl ErrorCategory {
    /// Short lowercase label, used as a log field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Validation => "validation",
            Self::Config => "config",
        }
    }
}

/// Unified error type for the daily-shuffle crate
#[derive(Error, Debug)]
pub enum Error {
    /// The document store could not be read or written
    #[error("Store unavailable during '{operation}': {reason}")]
    StoreUnavailable { operation: String, reason: String },

    /// A caller passed an argument outside the accepted domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A document with the same key has already been written
    #[error("Document '{key}' already exists")]
    DocumentExists { key: String },

    /// A stored document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a store-unavailable error
    pub fn store_unavailable(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is transient (a later invocation may succeed)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. } | Self::Io(_))
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StoreUnavailable { .. } | Self::DocumentExists { .. } | Self::Io(_) => {
                ErrorCategory::Storage
            }
            Self::InvalidArgument(_) | Self::Serialization(_) => ErrorCategory::Validation,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::store_unavailable("sqlite", err.to_string())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let store_err = Error::store_unavailable("latest", "connection refused");
        assert_eq!(store_err.category(), ErrorCategory::Storage);

        let arg_err = Error::invalid_argument("size must be positive");
        assert_eq!(arg_err.category(), ErrorCategory::Validation);

        let exists = Error::DocumentExists {
            key: "2024-01-01T00:00:00.000Z".to_string(),
        };
        assert_eq!(exists.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::store_unavailable("append", "timeout").is_recoverable());
        assert!(!Error::invalid_argument("n = 0").is_recoverable());
        assert!(!Error::config("bad port").is_recoverable());
    }

    #[test]
    fn test_display_includes_operation() {
        let err = Error::store_unavailable("count_all", "disk I/O error");
        let msg = err.to_string();
        assert!(msg.contains("count_all"));
        assert!(msg.contains("disk I/O error"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_from_rusqlite_error() {
        let err: Error = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, Error::StoreUnavailable { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(ErrorCategory::Storage.as_str(), "storage");
        assert_eq!(ErrorCategory::Config.as_str(), "config");
    }
}

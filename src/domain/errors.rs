// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration synchronization crate.
//!
//! All errors use `thiserror`. Only misuse (bad arguments, namespace
//! mismatch) and write-path store failures ever reach callers; read paths
//! degrade to cached/empty/zero results and log instead.

use thiserror::Error;

/// The main error type for configuration operations.
///
/// Marked `#[non_exhaustive]` to allow future additions without breaking
/// backwards compatibility.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required argument was missing, empty, or out of range.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument.
        message: String,
    },

    /// An entry's application namespace does not match the reader's.
    #[error("Configuration application name does not match: {actual} != {expected}")]
    ApplicationMismatch {
        /// The reader's bound application namespace.
        expected: String,
        /// The namespace carried by the offending entry.
        actual: String,
    },

    /// The durable store failed or was unreachable.
    #[error("Configuration store error: {message}")]
    StoreError {
        /// The error message.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The change notification channel failed.
    #[error("Change channel error: {message}")]
    ChannelError {
        /// The error message.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ConfigError {
    /// Creates an `InvalidArgument` error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ConfigError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a `StoreError` wrapping an underlying cause.
    pub fn store(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::StoreError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a `ChannelError` wrapping an underlying cause.
    pub fn channel(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::ChannelError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let error = ConfigError::invalid_argument("key must not be empty");
        assert_eq!(error.to_string(), "Invalid argument: key must not be empty");
    }

    #[test]
    fn test_application_mismatch_display() {
        let error = ConfigError::ApplicationMismatch {
            expected: "service-a".to_string(),
            actual: "service-b".to_string(),
        };
        assert!(error.to_string().contains("service-b != service-a"));
    }

    #[test]
    fn test_store_error_with_source() {
        let io_error = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = ConfigError::store("connect failed", io_error);
        assert!(error.to_string().contains("connect failed"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_channel_error_without_source() {
        let error = ConfigError::ChannelError {
            message: "already subscribed".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Change channel error: already subscribed"
        );
    }
}

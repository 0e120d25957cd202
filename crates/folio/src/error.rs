//! Error types for folio.
//!
//! This module defines all error types used throughout the folio crate. Storage
//! and configuration failures carry full context for logging; the HTTP layer
//! decides how much of that reaches the caller.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for folio operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    /// A submission was missing one of its required fields.
    #[error("Missing required fields")]
    MissingFields {
        /// Names of the fields that were missing or empty.
        fields: Vec<&'static str>,
    },

    /// A submission named a feedback type outside the known set.
    #[error("Invalid feedback type: {value}")]
    InvalidFeedbackType {
        /// The rejected value.
        value: String,
    },

    /// A summary was requested for a date that is not `YYYY-MM-DD`.
    #[error("Invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected value.
        value: String,
    },

    // === Storage Errors ===
    /// Failed to read the feedback store.
    #[error("failed to read feedback store at {path}: {source}")]
    StoreRead {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the feedback store.
    #[error("failed to write feedback store at {path}: {source}")]
    StoreWrite {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to append to a daily log file.
    #[error("failed to append daily log {path}: {source}")]
    DailyLog {
        /// Path to the daily log file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Server Errors ===
    /// The HTTP listener could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// The address that was requested.
        address: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for folio operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid feedback type error.
    #[must_use]
    pub fn invalid_feedback_type(value: impl Into<String>) -> Self {
        Self::InvalidFeedbackType {
            value: value.into(),
        }
    }

    /// Check if this error was caused by bad caller input rather than by
    /// the service itself.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingFields { .. } | Self::InvalidFeedbackType { .. } | Self::InvalidDate { .. }
        )
    }

    /// Check if this error came from the feedback store.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::StoreRead { .. }
                | Self::StoreWrite { .. }
                | Self::DailyLog { .. }
                | Self::DirectoryCreate { .. }
                | Self::Io(_)
                | Self::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_display_is_generic() {
        let err = Error::MissingFields {
            fields: vec!["name", "message"],
        };
        assert_eq!(err.to_string(), "Missing required fields");
    }

    #[test]
    fn test_is_validation() {
        assert!(Error::MissingFields { fields: vec![] }.is_validation());
        assert!(Error::invalid_feedback_type("rant").is_validation());
        assert!(Error::InvalidDate {
            value: "yesterday".to_string()
        }
        .is_validation());
        assert!(!Error::DailyLog {
            path: PathBuf::from("/tmp/feedback_2025-01-01.txt"),
            source: std::io::Error::other("disk full"),
        }
        .is_validation());
    }

    #[test]
    fn test_is_storage() {
        let err = Error::StoreWrite {
            path: PathBuf::from("/tmp/feedback.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_storage());
        assert!(!err.is_validation());
        assert!(!Error::invalid_feedback_type("x").is_storage());
    }

    #[test]
    fn test_invalid_feedback_type_display() {
        let err = Error::invalid_feedback_type("rant");
        assert_eq!(err.to_string(), "Invalid feedback type: rant");
    }

    #[test]
    fn test_invalid_date_display() {
        let err = Error::InvalidDate {
            value: "01/02/2025".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("01/02/2025"));
        assert!(msg.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_store_read_error_display() {
        let err = Error::StoreRead {
            path: PathBuf::from("/data/feedback.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/feedback.json"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn test_bind_error_display() {
        let err = Error::Bind {
            address: "0.0.0.0:3000".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(err.to_string().contains("0.0.0.0:3000"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
        assert!(err.is_storage());
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "port must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("port must be greater than 0"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}

//! Error types for fieldgate.
//!
//! The filtering core is total and never fails. These errors belong to the
//! layers around it: configuration loading, reading input documents, and
//! parsing schema files.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fieldgate operations.
#[derive(Error, Debug)]
pub enum Error {
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

    // === Schema Errors ===
    /// A schema document could not be interpreted at all.
    #[error("invalid filter schema: {message}")]
    SchemaParse {
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to read an input document.
    #[error("failed to read {path}: {source}")]
    InputRead {
        /// Path of the input that couldn't be read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure (stdin, stdout).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for fieldgate operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new schema parse error.
    #[must_use]
    pub fn schema_parse(message: impl Into<String>) -> Self {
        Self::SchemaParse {
            message: message.into(),
        }
    }

    /// Create a new configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error came from the configuration layer.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigLoad(_) | Self::ConfigValidation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_parse_display() {
        let err = Error::schema_parse("bad tag");
        assert_eq!(err.to_string(), "invalid filter schema: bad tag");
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::config_validation("version_key must not be empty");
        assert!(err.to_string().contains("version_key"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_schema_parse_is_not_config_error() {
        assert!(!Error::schema_parse("bad tag").is_config_error());
    }

    #[test]
    fn test_input_read_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::InputRead {
            path: PathBuf::from("/tmp/record.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/record.json"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("pipe closed"));
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
    fn test_from_figment_error() {
        let err: Error = figment::Error::from("bad value".to_string()).into();
        assert!(matches!(err, Error::ConfigLoad(_)));
        assert!(err.is_config_error());
    }
}

//! Unified error types for sbom-repo.
//!
//! One taxonomy covers the whole request path: validation, codec, storage,
//! and negotiation failures all surface as [`RepoError`] so the HTTP layer
//! can map each kind to a status code in a single place.

use std::path::PathBuf;
use thiserror::Error;

use crate::codec::BomFormat;

/// Main error type for repository operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RepoError {
    /// Serial number does not match the canonical `urn:uuid:...` form.
    #[error("invalid serial number {value:?}: {reason}")]
    InvalidSerialNumber { value: String, reason: String },

    /// BOM version is not a positive integer.
    #[error("invalid version {value:?}: must be a positive integer")]
    InvalidVersion { value: String },

    /// Request body failed to decode under the declared format.
    #[error("failed to decode {format} body: {reason}")]
    Decode { format: BomFormat, reason: String },

    /// The requested `(format, schema version)` cell is not supported.
    #[error("unsupported format/version: {0}")]
    UnsupportedFormatVersion(String),

    /// No stored entry for the requested `(serial, version)`.
    #[error("BOM not found: {serial} version {}", version.map_or_else(|| "latest".to_string(), |v| v.to_string()))]
    NotFound {
        serial: String,
        version: Option<u32>,
    },

    /// A `(serial, version)` entry already exists; entries are immutable.
    #[error("BOM already exists: {serial} version {version}")]
    AlreadyExists { serial: String, version: u32 },

    /// HTTP method disabled by configuration.
    #[error("method not allowed (enabled: {allowed})")]
    MethodNotAllowed { allowed: String },

    /// Filesystem I/O failure with path context.
    #[error("storage failure at {path:?}: {message}")]
    Storage {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration errors
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenient Result type for repository operations
pub type Result<T> = std::result::Result<T, RepoError>;

impl RepoError {
    /// Create an invalid-serial error
    pub fn invalid_serial(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSerialNumber {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a decode error for the given format
    pub fn decode(format: BomFormat, reason: impl Into<String>) -> Self {
        Self::Decode {
            format,
            reason: reason.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(serial: impl Into<String>, version: Option<u32>) -> Self {
        Self::NotFound {
            serial: serial.into(),
            version,
        }
    }

    /// Create a storage error with path context
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            message: source.to_string(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for errors caused by the client request rather than the server.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage { .. } | Self::Config(_))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            path: None,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_context() {
        let err = RepoError::invalid_serial("urn:uuid:nope", "truncated UUID");
        assert!(err.to_string().contains("urn:uuid:nope"));
        assert!(err.to_string().contains("truncated UUID"));

        let err = RepoError::not_found("urn:uuid:x", Some(3));
        assert!(err.to_string().contains("version 3"));

        let err = RepoError::not_found("urn:uuid:x", None);
        assert!(err.to_string().contains("latest"));
    }

    #[test]
    fn test_storage_error_keeps_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = RepoError::storage("/data/boms/x/1", io);
        assert!(err.to_string().contains("/data/boms/x/1"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_client_error_classification() {
        assert!(RepoError::InvalidVersion { value: "0".into() }.is_client_error());
        assert!(!RepoError::config("bad").is_client_error());
    }
}

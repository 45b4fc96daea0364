//! Error types for mod_fetcher
//!
//! This module defines the error types for every stage of a batch run.
//! Per-item errors (validation, resolution, fetch) are turned into failure
//! records by the coordinator; batch-level errors abort the run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors for a single malformed entry of the mod list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Entry is not a JSON object
    #[error("Entry is not an object")]
    NotAnObject,

    /// Entry has no usable `name`
    #[error("Entry is missing a non-empty \"name\"")]
    MissingName,

    /// Entry carries a `url` that is not a well-formed absolute URL
    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors while looking up a compatible artifact on the index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Search returned no projects
    #[error("No matching mod found.")]
    NoMatch,

    /// Project has no version for the requested loader and game version
    #[error("No compatible version found.")]
    NoCompatibleVersion,

    /// Request to the index failed
    #[error("{0}")]
    Transport(String),

    /// Index answered with something we could not interpret
    #[error("Malformed response from index: {0}")]
    MalformedResponse(String),
}

/// Download errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection could not be established, after all attempts
    #[error("Network connection error while trying to download the file.")]
    Connection { attempts: u32 },

    /// Response or body read timed out, after all attempts
    #[error("The request timed out while trying to download the file.")]
    Timeout { attempts: u32 },

    /// Non-retryable transport or protocol failure
    #[error("An error occurred during the request: {0}")]
    Request(String),

    /// I/O error while writing the artifact or its sidecar
    #[error("File I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sidecar metadata could not be serialized
    #[error("Failed to serialize metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// Batch was cancelled while the download was pending a retry
    #[error("Download cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether this error belongs to the retryable class
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Connection { .. } | FetchError::Timeout { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that abort a whole batch before any item is processed
#[derive(Error, Debug)]
pub enum BatchError {
    /// Mod list could not be read
    #[error("Failed to read mod list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mod list is not valid JSON
    #[error("Invalid JSON in mod list {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Mod list is valid JSON but not an array
    #[error("Invalid JSON format. Expecting a list of mods.")]
    NotAnArray,

    /// Output directory could not be created
    #[error("Output directory not accessible: {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure log could not be written
    #[error("Failed to write failure log {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Worker task panicked or was aborted
    #[error("Batch worker terminated unexpectedly: {0}")]
    Worker(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read or written
    #[error("Configuration file I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// User config directory unknown on this platform
    #[error("Could not determine user config directory")]
    NoConfigDir,

    /// HTTP client could not be built
    #[error("Failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Resolution error
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Batch error
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Fetch(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Resolution(_) => "resolution",
            AppError::Fetch(e) if e.is_transient() => "transient_fetch",
            AppError::Fetch(_) => "fetch",
            AppError::Batch(_) => "batch",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Resolution result type alias
pub type ResolutionResult<T> = std::result::Result<T, ResolutionError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Batch result type alias
pub type BatchResult<T> = std::result::Result<T, BatchError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_item_messages() {
        assert_eq!(ResolutionError::NoMatch.to_string(), "No matching mod found.");
        assert_eq!(
            ResolutionError::NoCompatibleVersion.to_string(),
            "No compatible version found."
        );
        assert_eq!(
            FetchError::Connection { attempts: 3 }.to_string(),
            "Network connection error while trying to download the file."
        );
        assert_eq!(
            FetchError::Timeout { attempts: 3 }.to_string(),
            "The request timed out while trying to download the file."
        );
        assert_eq!(
            FetchError::Request("HTTP status 404 Not Found".to_string()).to_string(),
            "An error occurred during the request: HTTP status 404 Not Found"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Connection { attempts: 1 }.is_transient());
        assert!(FetchError::Timeout { attempts: 1 }.is_transient());
        assert!(!FetchError::Request("bad".to_string()).is_transient());
        assert!(!FetchError::Cancelled.is_transient());
    }

    #[test]
    fn test_app_error_category() {
        let err = AppError::from(FetchError::Timeout { attempts: 3 });
        assert_eq!(err.category(), "transient_fetch");
        assert!(err.is_recoverable());

        let err = AppError::from(BatchError::NotAnArray);
        assert_eq!(err.category(), "batch");
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "Invalid JSON format. Expecting a list of mods.");
    }
}

//! Application constants for mod_fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Package index endpoints
pub mod index {
    /// Modrinth API base URL
    pub const BASE_URL: &str = "https://api.modrinth.com/v2";

    /// Search endpoint path segment
    pub const SEARCH_PATH: &str = "search";

    /// Project endpoint path segment
    pub const PROJECT_PATH: &str = "project";

    /// Version list path segment under a project
    pub const VERSION_PATH: &str = "version";

    /// Facet prefix for loader categories
    pub const LOADER_FACET: &str = "categories";

    /// Facet prefix for game versions
    pub const GAME_VERSION_FACET: &str = "versions";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("mod_fetcher/", env!("CARGO_PKG_VERSION"));

    /// Timeout for index API requests
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum time to wait for response headers or the next body chunk
    pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
}

/// Rate limiting and retry configuration
pub mod limits {
    /// Ceiling for index API requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 5;

    /// Total download attempts per artifact, including the first
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Base delay for exponential backoff (milliseconds); delay before retry i is base * 2^i
    pub const RETRY_BASE_DELAY_MS: u64 = 1000;

    /// Pause after each request's terminal transition (milliseconds)
    pub const PACING_DELAY_MS: u64 = 1000;
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Suffix appended to an artifact path for its metadata sidecar
    pub const METADATA_SUFFIX: &str = ".meta.json";

    /// Failure log written into the output directory
    pub const FAILURE_LOG_NAME: &str = "failed_downloads.log";

    /// Extension used when the resolved file name carries none
    pub const DEFAULT_ARTIFACT_EXTENSION: &str = "jar";

    /// Download chunk size for streaming (8KB)
    pub const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;

    /// Indentation used for sidecar JSON
    pub const METADATA_INDENT: &[u8] = b"    ";
}

/// User-facing failure reasons recorded in the failure log
pub mod reasons {
    /// Reason recorded for entries that fail validation
    pub const INVALID_ENTRY: &str = "missing required fields or invalid URL";

    /// Name recorded for entries that carry no usable name
    pub const UNKNOWN_NAME: &str = "Unknown";

    /// Reason recorded for entries never reached because the batch was cancelled
    pub const CANCELLED: &str = "batch cancelled before processing";
}

/// Configuration file locations
pub mod config {
    /// Directory name under the user config dir
    pub const APP_DIR_NAME: &str = "mod-fetcher";

    /// Config file name under the user config dir
    pub const CONFIG_FILE_NAME: &str = "config.toml";

    /// Project-local config file
    pub const LOCAL_CONFIG_FILE: &str = "./mod-fetcher.toml";
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";

    /// Crate target used in the env filter directive
    pub const LOG_TARGET: &str = "mod_fetcher";
}

// Re-export commonly used constants for convenience
pub use files::{FAILURE_LOG_NAME, METADATA_SUFFIX, TEMP_FILE_SUFFIX};
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use index::BASE_URL as MODRINTH_BASE_URL;
pub use limits::{DEFAULT_RATE_LIMIT_RPS, MAX_ATTEMPTS, PACING_DELAY_MS, RETRY_BASE_DELAY_MS};

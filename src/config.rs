//! Configuration management for mod_fetcher
//!
//! Every setting has a default, so running without a config file uses the
//! documented timings: 10s timeouts, 3 attempts with 1s/2s backoff, 1s pacing
//! and a 5 req/s ceiling on index calls. Files are TOML with the sections
//! `[index]`, `[fetcher]`, `[batch]` and `[logging]`; any section or key may be
//! omitted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, CoordinatorConfig, FetcherConfig};
use crate::constants::{config as paths, files, http, index, limits, logging};
use crate::errors::{ConfigError, ConfigResult};

/// Application configuration as stored in TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Package index settings
    pub index: IndexConfigToml,
    /// Artifact download settings
    pub fetcher: FetcherConfigToml,
    /// Batch run settings
    pub batch: BatchConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly index client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfigToml {
    /// Index API base URL
    pub base_url: String,
    /// Ceiling on index requests per second
    pub rate_limit_rps: u32,
    /// Total timeout per index request in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
}

impl Default for IndexConfigToml {
    fn default() -> Self {
        Self {
            base_url: index::BASE_URL.to_string(),
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            pool_idle_timeout_secs: Some(http::POOL_IDLE_TIMEOUT.as_secs()),
        }
    }
}

/// TOML-friendly fetcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfigToml {
    /// Total attempts per artifact
    pub max_attempts: u32,
    /// Backoff base in milliseconds; retry i waits base * 2^i
    pub retry_base_delay_ms: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Read timeout per chunk in seconds
    pub read_timeout_secs: u64,
    /// Write chunk size in bytes
    pub chunk_size: usize,
}

impl Default for FetcherConfigToml {
    fn default() -> Self {
        Self {
            max_attempts: limits::MAX_ATTEMPTS,
            retry_base_delay_ms: limits::RETRY_BASE_DELAY_MS,
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            read_timeout_secs: http::READ_TIMEOUT.as_secs(),
            chunk_size: files::DOWNLOAD_CHUNK_SIZE,
        }
    }
}

/// TOML-friendly batch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfigToml {
    /// Pause after each request that reached the index, in milliseconds
    pub pacing_delay_ms: u64,
    /// Loader used when none is given on the command line
    pub default_loader: String,
}

impl Default for BatchConfigToml {
    fn default() -> Self {
        Self {
            pacing_delay_ms: limits::PACING_DELAY_MS,
            default_loader: "fabric".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Runtime configurations derived from an `AppConfig`
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub client: ClientConfig,
    pub fetcher: FetcherConfig,
    pub coordinator: CoordinatorConfig,
}

impl AppConfig {
    /// Convert to the runtime configurations, validating each
    pub fn to_runtime_config(&self) -> ConfigResult<RuntimeConfig> {
        let client = self.index.to_runtime_config();
        client.parsed_base_url()?;

        let fetcher = self.fetcher.to_runtime_config();
        fetcher.validate()?;

        let coordinator = self.batch.to_runtime_config();
        coordinator.validate()?;

        if client.rate_limit_rps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "index.rate_limit_rps".to_string(),
                value: "0".to_string(),
                reason: "Rate limit must be non-zero".to_string(),
            });
        }

        Ok(RuntimeConfig {
            client,
            fetcher,
            coordinator,
        })
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Otherwise the first existing file of
    /// `./mod-fetcher.toml` and the user config file is used, falling back
    /// to defaults when neither exists.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        if let Some(path) = config_file_override {
            if !path.exists() {
                return Err(ConfigError::NotFound { path });
            }
            return Self::load_from_file(&path).await;
        }

        match Self::find_config_file(&Self::search_paths()) {
            Some(path) => Self::load_from_file(&path).await,
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the commented default config to the user config directory
    ///
    /// Returns the path and whether a file was written. An existing file is
    /// left alone unless `force` is set.
    pub async fn initialize(force: bool) -> ConfigResult<(PathBuf, bool)> {
        let config_path = Self::default_config_path()?;
        let written = Self::write_default_config(&config_path, force).await?;
        Ok((config_path, written))
    }

    /// Write the commented default config to `path`
    pub async fn write_default_config(path: &Path, force: bool) -> ConfigResult<bool> {
        if path.exists() && !force {
            debug!("Config file already exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Created default configuration file: {}", path.display());
        Ok(true)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Candidate config files, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(paths::LOCAL_CONFIG_FILE)];
        if let Ok(user_config) = Self::default_config_path() {
            paths.push(user_config);
        }
        paths
    }

    /// First existing file among `candidates`
    pub fn find_config_file(candidates: &[PathBuf]) -> Option<PathBuf> {
        let found = candidates.iter().find(|path| path.is_file()).cloned();
        match &found {
            Some(path) => debug!("Found config file: {}", path.display()),
            None => debug!("No config file found in standard locations"),
        }
        found
    }

    /// Default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir
            .join(paths::APP_DIR_NAME)
            .join(paths::CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Default configuration with comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# mod_fetcher configuration
# Every key is optional; removed keys fall back to the values shown here.

[index]
# Package index API
base_url = "{base_url}"
# Ceiling on search and version-list requests per second
rate_limit_rps = {rps}
request_timeout_secs = {timeout}
connect_timeout_secs = {timeout}
pool_idle_timeout_secs = {idle}

[fetcher]
# Attempts per artifact; only connection failures and timeouts are retried
max_attempts = {attempts}
# Retry i waits retry_base_delay_ms * 2^i
retry_base_delay_ms = {backoff}
connect_timeout_secs = {timeout}
# Maximum wait for the response and for each body chunk
read_timeout_secs = {timeout}
chunk_size = {chunk}

[batch]
# Pause after each mod that reached the index
pacing_delay_ms = {pacing}
default_loader = "fabric"

[logging]
level = "{level}"  # error, warn, info, debug, trace
"#,
            base_url = index::BASE_URL,
            rps = limits::DEFAULT_RATE_LIMIT_RPS,
            timeout = http::DEFAULT_TIMEOUT.as_secs(),
            idle = http::POOL_IDLE_TIMEOUT.as_secs(),
            attempts = limits::MAX_ATTEMPTS,
            backoff = limits::RETRY_BASE_DELAY_MS,
            chunk = files::DOWNLOAD_CHUNK_SIZE,
            pacing = limits::PACING_DELAY_MS,
            level = logging::DEFAULT_LOG_LEVEL,
        )
    }
}

impl IndexConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            pool_idle_timeout: self.pool_idle_timeout_secs.map(Duration::from_secs),
            rate_limit_rps: self.rate_limit_rps,
            ..ClientConfig::default()
        }
    }
}

impl FetcherConfigToml {
    /// Convert to runtime FetcherConfig
    pub fn to_runtime_config(&self) -> FetcherConfig {
        FetcherConfig {
            max_attempts: self.max_attempts,
            retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            chunk_size: self.chunk_size,
            ..FetcherConfig::default()
        }
    }
}

impl BatchConfigToml {
    /// Convert to runtime CoordinatorConfig
    pub fn to_runtime_config(&self) -> CoordinatorConfig {
        CoordinatorConfig::default().with_pacing_delay(Duration::from_millis(self.pacing_delay_ms))
    }
}

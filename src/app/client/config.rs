//! HTTP client configuration and building logic
//!
//! Two clients are built from here: one for index API calls, bounded by a
//! total request timeout and a rate ceiling, and one for artifact downloads,
//! bounded only at connect time (body reads are timed per chunk by the fetcher).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{files, http, index, limits};
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the index API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Index API base URL
    pub base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Request timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: index::BASE_URL.to_string(),
            user_agent: http::USER_AGENT.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

impl ClientConfig {
    /// Point the client at a different index
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Parse and check the base URL
    pub fn parsed_base_url(&self) -> ConfigResult<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "index.base_url".to_string(),
            value: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "index.base_url".to_string(),
                value: self.base_url.clone(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(url)
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> ConfigResult<Client> {
        let mut client_builder = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str());

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(ConfigError::HttpClient)
    }
}

/// Configuration for artifact downloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Total attempts per artifact, including the first
    pub max_attempts: u32,
    /// Backoff before retry `i` (0-indexed) is `retry_base_delay * 2^i`
    pub retry_base_delay: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Maximum wait for response headers and for each body chunk
    pub read_timeout: Duration,
    /// Write size for the artifact file
    pub chunk_size: usize,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: limits::MAX_ATTEMPTS,
            retry_base_delay: Duration::from_millis(limits::RETRY_BASE_DELAY_MS),
            connect_timeout: http::CONNECT_TIMEOUT,
            read_timeout: http::READ_TIMEOUT,
            chunk_size: files::DOWNLOAD_CHUNK_SIZE,
            user_agent: http::USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    /// Delay before retry `retry_index` (0-indexed)
    pub fn backoff_delay(&self, retry_index: u32) -> Duration {
        let factor = 2_u32.checked_pow(retry_index).unwrap_or(u32::MAX);
        self.retry_base_delay.saturating_mul(factor)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetcher.max_attempts".to_string(),
                value: "0".to_string(),
                reason: "At least one attempt is required".to_string(),
            });
        }

        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetcher.chunk_size".to_string(),
                value: "0".to_string(),
                reason: "Chunk size must be greater than 0".to_string(),
            });
        }

        if self.read_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "fetcher.read_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Read timeout cannot be zero".to_string(),
            });
        }

        Ok(())
    }

    /// Builds the download client; no total timeout so large bodies can stream
    pub fn build_http_client(&self) -> ConfigResult<Client> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .pool_idle_timeout(http::POOL_IDLE_TIMEOUT)
            .build()
            .map_err(ConfigError::HttpClient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.modrinth.com/v2");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.rate_limit_rps, limits::DEFAULT_RATE_LIMIT_RPS);
        assert!(config.parsed_base_url().is_ok());
    }

    #[test]
    fn test_client_config_rejects_bad_base_url() {
        let config = ClientConfig::default().with_base_url("not a url");
        assert!(matches!(
            config.parsed_base_url(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let config = ClientConfig::default().with_base_url("mailto:someone@example.com");
        assert!(config.parsed_base_url().is_err());
    }

    #[test]
    fn test_http_client_creation() {
        assert!(ClientConfig::default().build_http_client().is_ok());
        assert!(FetcherConfig::default().build_http_client().is_ok());
    }

    #[test]
    fn test_backoff_delays() {
        let config = FetcherConfig::default();
        assert_eq!(config.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn test_fetcher_config_validation() {
        assert!(FetcherConfig::default().validate().is_ok());

        let config = FetcherConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FetcherConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

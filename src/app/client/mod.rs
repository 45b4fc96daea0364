//! HTTP clients for the package index and artifact downloads
//!
//! The module is organized into specialized components:
//! - `config`: client configuration and building
//! - `http`: rate-limited JSON requests against the index API
//! - `download`: streaming artifact download with retry and sidecar writes

use url::Url;

use crate::errors::{ConfigResult, ResolutionError, ResolutionResult};

pub mod config;
pub mod download;
pub mod http;

pub use config::{ClientConfig, FetcherConfig};
pub use download::{metadata_path_for, AttemptOutcome, StreamingFetcher, TransientKind};
pub use http::HttpHandler;

/// Client for the package index API
///
/// Wraps the rate-limited handler together with the index base URL so
/// callers address endpoints by path segment.
#[derive(Debug)]
pub struct IndexClient {
    http_handler: HttpHandler,
    base_url: Url,
}

impl IndexClient {
    /// Creates an index client against the public Modrinth API
    pub fn new() -> ConfigResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates an index client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL is invalid, the rate limit is
    /// zero or the HTTP client cannot be built
    pub fn with_config(config: ClientConfig) -> ConfigResult<Self> {
        let base_url = config.parsed_base_url()?;
        let client = config.build_http_client()?;
        let http_handler = HttpHandler::new(client, config.rate_limit_rps)?;

        tracing::debug!("Created index client for {}", base_url);

        Ok(Self {
            http_handler,
            base_url,
        })
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment
    pub fn endpoint(&self, segments: &[&str]) -> ResolutionResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ResolutionError::MalformedResponse(format!(
                    "index base URL cannot take a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET an index endpoint and decode its JSON body
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> ResolutionResult<T> {
        let url = self.endpoint(segments)?;
        self.http_handler.get_json(&url, query).await
    }

    /// Get the base URL for the index
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

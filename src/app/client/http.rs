//! Core HTTP operations against the index API
//!
//! Index requests are rate limited and made exactly once: a failed lookup is
//! reported to the caller instead of being retried at this layer.

use std::num::NonZeroU32;

use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::errors::{ConfigError, ConfigResult, ResolutionError, ResolutionResult};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP operations handler for the index API
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: DirectRateLimiter,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and rate limiting
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the rate limit is zero
    pub fn new(client: Client, rate_limit_rps: u32) -> ConfigResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    fn build_rate_limiter(rate_limit_rps: u32) -> ConfigResult<DirectRateLimiter> {
        let rps = NonZeroU32::new(rate_limit_rps).ok_or_else(|| ConfigError::InvalidValue {
            field: "index.rate_limit_rps".to_string(),
            value: rate_limit_rps.to_string(),
            reason: "Rate limit must be non-zero".to_string(),
        })?;
        Ok(RateLimiter::direct(Quota::per_second(rps)))
    }

    /// GET `url` with the given query pairs and decode the JSON body
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::Transport` for connection failures and error
    /// statuses, `ResolutionError::MalformedResponse` for undecodable bodies
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        query: &[(&str, &str)],
    ) -> ResolutionResult<T> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Error fetching mod details: {}", e);
                ResolutionError::Transport(e.to_string())
            })?;

        let response = response.error_for_status().map_err(|e| {
            tracing::error!("Index returned error status: {}", e);
            ResolutionError::Transport(e.to_string())
        })?;

        let body = response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                tracing::error!("Undecodable index response from {}: {}", url, e);
                ResolutionError::MalformedResponse(e.to_string())
            } else {
                tracing::error!("Error reading index response from {}: {}", url, e);
                ResolutionError::Transport(e.to_string())
            }
        })?;

        tracing::debug!("Successfully fetched {}", url);
        Ok(body)
    }
}

//! Streaming artifact download with bounded retry
//!
//! The body is streamed into a temporary file next to the destination and
//! renamed into place once complete, then the metadata sidecar is written the
//! same way. A failed download leaves neither file behind.
//!
//! Only connection failures and timeouts are retried, with exponential
//! backoff; every other failure is final on the first attempt. Rate-limit
//! statuses (HTTP 429) are deliberately not treated as transient.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::{Client, Response};
use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::app::client::config::FetcherConfig;
use crate::app::models::{ArtifactMetadata, DownloadOutcome};
use crate::constants::files;
use crate::errors::{ConfigResult, FetchError, FetchResult};

/// Retryable failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    /// Connection could not be established
    Connection,
    /// Headers or body did not arrive in time
    Timeout,
}

impl TransientKind {
    fn into_error(self, attempts: u32) -> FetchError {
        match self {
            TransientKind::Connection => FetchError::Connection { attempts },
            TransientKind::Timeout => FetchError::Timeout { attempts },
        }
    }
}

/// Result of a single download attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Body fully written to the temporary file
    Ok(u64),
    /// Worth another attempt
    Retryable(TransientKind),
    /// Give up immediately
    Fatal(FetchError),
}

impl AttemptOutcome {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_connect() {
            AttemptOutcome::Retryable(TransientKind::Connection)
        } else if error.is_timeout() {
            AttemptOutcome::Retryable(TransientKind::Timeout)
        } else {
            AttemptOutcome::Fatal(FetchError::Request(error.to_string()))
        }
    }
}

/// Downloads one artifact at a time with retry and sidecar persistence
#[derive(Debug, Clone)]
pub struct StreamingFetcher {
    client: Client,
    config: FetcherConfig,
    cancel: CancellationToken,
}

impl StreamingFetcher {
    /// Creates a fetcher with its own download client
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid or the client
    /// cannot be built
    pub fn new(config: FetcherConfig) -> ConfigResult<Self> {
        config.validate()?;
        let client = config.build_http_client()?;
        Ok(Self {
            client,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Abort pending retries when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Download `url` to `destination` and write `metadata` beside it
    ///
    /// On success both `destination` and `{destination}.meta.json` exist.
    /// On failure neither file is created by this call.
    pub async fn fetch(
        &self,
        url: &Url,
        destination: &Path,
        metadata: &ArtifactMetadata,
    ) -> DownloadOutcome {
        let (result, attempts) = self.fetch_with_retry(url, destination, metadata).await;
        match result {
            Ok(bytes) => {
                info!(
                    "Downloaded {} bytes to {} in {} attempt(s)",
                    bytes,
                    destination.display(),
                    attempts
                );
                DownloadOutcome::succeeded(destination.to_path_buf(), attempts)
            }
            Err(e) => DownloadOutcome::failed(e.to_string(), attempts),
        }
    }

    async fn fetch_with_retry(
        &self,
        url: &Url,
        destination: &Path,
        metadata: &ArtifactMetadata,
    ) -> (FetchResult<u64>, u32) {
        let temp_path = temp_path_for(destination);
        let mut attempts = 0;

        let result = loop {
            attempts += 1;
            match self.attempt(url, &temp_path).await {
                AttemptOutcome::Ok(bytes) => {
                    break self
                        .persist(&temp_path, destination, metadata)
                        .await
                        .map(|()| bytes);
                }
                AttemptOutcome::Fatal(e) => {
                    error!("Request exception during download: {}", e);
                    break Err(e);
                }
                AttemptOutcome::Retryable(kind) => {
                    if attempts >= self.config.max_attempts {
                        let e = kind.into_error(attempts);
                        error!("Download of {} failed after {} attempts: {}", url, attempts, e);
                        break Err(e);
                    }

                    let delay = self.config.backoff_delay(attempts - 1);
                    warn!(
                        "Download failed (attempt {}/{}): {:?}. Retrying in {}ms",
                        attempts,
                        self.config.max_attempts,
                        kind,
                        delay.as_millis()
                    );

                    tokio::select! {
                        _ = self.cancel.cancelled() => {
                            info!("Download of {} cancelled during backoff", url);
                            break Err(FetchError::Cancelled);
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        };

        if result.is_err() {
            remove_if_exists(&temp_path).await;
        }

        (result, attempts)
    }

    /// One GET, streamed into `temp_path`
    async fn attempt(&self, url: &Url, temp_path: &Path) -> AttemptOutcome {
        let request = self.client.get(url.clone()).send();
        let response = match tokio::time::timeout(self.config.read_timeout, request).await {
            Err(_) => return AttemptOutcome::Retryable(TransientKind::Timeout),
            Ok(Err(e)) => return AttemptOutcome::from_reqwest(e),
            Ok(Ok(response)) => response,
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::Fatal(FetchError::Request(e.to_string())),
        };

        match self.stream_to_file(response, temp_path).await {
            Ok(bytes) => AttemptOutcome::Ok(bytes),
            Err(outcome) => {
                remove_if_exists(temp_path).await;
                outcome
            }
        }
    }

    async fn stream_to_file(
        &self,
        response: Response,
        temp_path: &Path,
    ) -> Result<u64, AttemptOutcome> {
        let io_error = |e: std::io::Error| AttemptOutcome::Fatal(FetchError::io(temp_path, e));

        let file = File::create(temp_path).await.map_err(io_error)?;
        let mut writer = BufWriter::with_capacity(self.config.chunk_size, file);
        let mut stream = Box::pin(response.bytes_stream());
        let mut written = 0_u64;

        loop {
            let next = tokio::time::timeout(self.config.read_timeout, stream.next())
                .await
                .map_err(|_| AttemptOutcome::Retryable(TransientKind::Timeout))?;

            match next {
                None => break,
                Some(Err(e)) => return Err(AttemptOutcome::from_reqwest(e)),
                Some(Ok(bytes)) => {
                    for chunk in bytes.chunks(self.config.chunk_size) {
                        writer.write_all(chunk).await.map_err(io_error)?;
                    }
                    written += bytes.len() as u64;
                }
            }
        }

        writer.flush().await.map_err(io_error)?;
        writer.get_ref().sync_all().await.map_err(io_error)?;
        Ok(written)
    }

    /// Move the artifact into place and write its sidecar
    async fn persist(
        &self,
        temp_path: &Path,
        destination: &Path,
        metadata: &ArtifactMetadata,
    ) -> FetchResult<()> {
        tokio::fs::rename(temp_path, destination)
            .await
            .map_err(|e| FetchError::io(destination, e))?;

        let sidecar = metadata_path_for(destination);
        if let Err(e) = write_sidecar(&sidecar, metadata).await {
            error!("Failed to write metadata {}: {}", sidecar.display(), e);
            remove_if_exists(destination).await;
            return Err(e);
        }

        debug!(
            "Downloaded file saved to: {}, metadata saved to: {}",
            destination.display(),
            sidecar.display()
        );
        Ok(())
    }
}

/// `{path}.meta.json`
pub fn metadata_path_for(path: &Path) -> PathBuf {
    append_suffix(path, files::METADATA_SUFFIX)
}

fn temp_path_for(path: &Path) -> PathBuf {
    append_suffix(path, files::TEMP_FILE_SUFFIX)
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Serialize `metadata` as JSON with 4-space indentation
pub fn render_metadata(metadata: &ArtifactMetadata) -> FetchResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(files::METADATA_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    metadata.serialize(&mut serializer)?;
    Ok(buffer)
}

async fn write_sidecar(path: &Path, metadata: &ArtifactMetadata) -> FetchResult<()> {
    let content = render_metadata(metadata)?;
    let temp_path = temp_path_for(path);

    let written = async {
        tokio::fs::write(&temp_path, &content).await?;
        tokio::fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = written {
        remove_if_exists(&temp_path).await;
        return Err(FetchError::io(path, e));
    }
    Ok(())
}

async fn remove_if_exists(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

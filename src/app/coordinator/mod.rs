//! Batch orchestration
//!
//! The coordinator walks the mod list strictly in input order. Each entry is
//! validated, resolved against the index and fetched, and ends in exactly one
//! terminal state: a saved artifact with its sidecar, or one `FailureRecord`.
//! After every terminal transition progress advances by one and, when the
//! entry reached the index, the coordinator pauses for the pacing delay.
//!
//! # Architecture
//!
//! - [`config`] - Coordinator tunables and per-run parameters
//! - [`progress`] - Event channel consumed by the terminal surface
//! - [`signals`] - Ctrl-C / SIGTERM to cancellation token
//! - [`stats`] - Run summary
//!
//! # Examples
//!
//! ```rust,no_run
//! use mod_fetcher::app::{
//!     ArtifactResolver, BatchConfig, Coordinator, CoordinatorConfig, IndexClient,
//!     ProgressReporter, StreamingFetcher,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = ArtifactResolver::new(IndexClient::new()?);
//! let fetcher = StreamingFetcher::new(Default::default())?;
//! let (reporter, _events) = ProgressReporter::channel();
//!
//! let coordinator = Coordinator::new(CoordinatorConfig::default(), resolver, fetcher, reporter);
//! let batch = BatchConfig::new("mods.json", "mods", "fabric", "1.21.1");
//! let result = coordinator.run(&batch).await?;
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod progress;
pub mod signals;
pub mod stats;

#[cfg(test)]
pub mod tests;

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app::client::StreamingFetcher;
use crate::app::models::{BatchProgress, FailureRecord, ModRequest};
use crate::app::modlist::load_mod_list;
use crate::app::report::FailureReporter;
use crate::app::resolver::ArtifactResolver;
use crate::constants::reasons;
use crate::errors::{BatchError, BatchResult};

pub use config::{BatchConfig, CoordinatorConfig};
pub use progress::{BatchEvent, ProgressReporter};
pub use signals::SignalHandler;
pub use stats::{format_duration, SessionResult};

/// Terminal state of one entry
#[derive(Debug, Clone, PartialEq, Eq)]
enum ItemOutcome {
    Saved(PathBuf),
    Failed(FailureRecord),
}

/// Sequential resolve-and-fetch pipeline over a mod list
pub struct Coordinator {
    config: CoordinatorConfig,
    resolver: ArtifactResolver,
    fetcher: StreamingFetcher,
    reporter: ProgressReporter,
    failure_reporter: FailureReporter,
    cancel: CancellationToken,
}

impl Coordinator {
    pub fn new(
        config: CoordinatorConfig,
        resolver: ArtifactResolver,
        fetcher: StreamingFetcher,
        reporter: ProgressReporter,
    ) -> Self {
        Self {
            config,
            resolver,
            fetcher,
            reporter,
            failure_reporter: FailureReporter::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Share `cancel` with the coordinator and its fetcher
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.fetcher = self.fetcher.with_cancellation(cancel.clone());
        self.cancel = cancel;
        self
    }

    /// Write the failure log under a different file name
    pub fn with_failure_reporter(mut self, failure_reporter: FailureReporter) -> Self {
        self.failure_reporter = failure_reporter;
        self
    }

    /// Token observed between requests, while pacing and during retry backoff
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one batch to completion
    ///
    /// # Errors
    ///
    /// Returns `BatchError` if the mod list cannot be read or is not a JSON
    /// array, or if the output directory cannot be created. In those cases
    /// no entry is processed and no status line is emitted.
    pub async fn run(&self, batch: &BatchConfig) -> BatchResult<SessionResult> {
        let started = Instant::now();
        let started_at = Utc::now();
        info!(
            "Starting batch at {} from {} into {} ({} {})",
            started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            batch.input_path.display(),
            batch.output_dir.display(),
            batch.loader,
            batch.game_version
        );

        let entries = load_mod_list(&batch.input_path).await?;
        tokio::fs::create_dir_all(&batch.output_dir)
            .await
            .map_err(|source| {
                debug!(
                    "Cannot create output directory {}: {}",
                    batch.output_dir.display(),
                    source
                );
                BatchError::OutputDir {
                    path: batch.output_dir.clone(),
                    source,
                }
            })?;

        let mut progress = BatchProgress::new(entries.len());
        let mut failures = Vec::new();
        let mut saved = Vec::new();
        self.reporter.set_progress(progress);

        for entry in &entries {
            let (outcome, reached_index) = self.process_entry(entry, batch).await;
            match outcome {
                ItemOutcome::Saved(path) => saved.push(path),
                ItemOutcome::Failed(record) => failures.push(record),
            }

            progress.advance();
            self.reporter.set_progress(progress);

            if reached_index {
                self.pace().await;
            }
        }

        let failure_log = if failures.is_empty() {
            None
        } else {
            match self.failure_reporter.report(&failures, &batch.output_dir).await {
                Ok(path) => {
                    self.reporter
                        .log_line(format!("Failed downloads logged to {}", path.display()));
                    Some(path)
                }
                Err(e) => {
                    error!("{}", e);
                    self.reporter.log_line(e.to_string());
                    None
                }
            }
        };

        let elapsed = started.elapsed();
        self.reporter.log_line(format!(
            "Download process complete in {:.2} seconds.",
            elapsed.as_secs_f64()
        ));

        Ok(SessionResult {
            progress,
            failures,
            saved,
            failure_log,
            started_at,
            elapsed,
            cancelled: self.cancel.is_cancelled(),
        })
    }

    /// Drive one entry to its terminal state
    ///
    /// The flag is true when the entry made at least one index request.
    async fn process_entry(&self, entry: &Value, batch: &BatchConfig) -> (ItemOutcome, bool) {
        if self.cancel.is_cancelled() {
            let name = ModRequest::display_name(entry);
            debug!("Skipping {} after cancellation", name);
            self.reporter
                .log_line(format!("Skipping {}: {}", name, reasons::CANCELLED));
            return (
                ItemOutcome::Failed(FailureRecord::new(name, reasons::CANCELLED)),
                false,
            );
        }

        let request = match ModRequest::from_value(entry) {
            Ok(request) => request,
            Err(e) => {
                warn!("Invalid mod list entry {}: {}", entry, e);
                self.reporter
                    .log_line(format!("Skipping invalid entry or malformed URL: {}", entry));
                let record =
                    FailureRecord::new(ModRequest::display_name(entry), reasons::INVALID_ENTRY);
                return (ItemOutcome::Failed(record), false);
            }
        };
        let name = request.name.as_str();

        let artifact = match self
            .resolver
            .resolve(name, &batch.loader, &batch.game_version)
            .await
        {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!("Resolution failed for {}: {}", name, e);
                self.reporter
                    .log_line(format!("Failed to resolve URL for {}: {}", name, e));
                return (
                    ItemOutcome::Failed(FailureRecord::new(name, e.to_string())),
                    true,
                );
            }
        };

        self.reporter.log_line(format!(
            "Downloading {} (Version: {})...",
            name, artifact.version_label
        ));

        let destination = batch.output_dir.join(artifact.artifact_file_name(name));
        let outcome = self
            .fetcher
            .fetch(&artifact.download_url, &destination, &artifact.metadata())
            .await;

        match (outcome.success, outcome.saved_path) {
            (true, Some(path)) => {
                self.reporter
                    .log_line(format!("Successfully downloaded {}.", name));
                (ItemOutcome::Saved(path), true)
            }
            (_, _) => {
                let reason = outcome
                    .error
                    .unwrap_or_else(|| "Unknown download error".to_string());
                self.reporter
                    .log_line(format!("Failed to download {}: {}", name, reason));
                (ItemOutcome::Failed(FailureRecord::new(name, reason)), true)
            }
        }
    }

    /// Sleep for the pacing delay unless cancelled
    async fn pace(&self) {
        if self.config.pacing_delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.config.pacing_delay) => {}
            _ = self.cancel.cancelled() => {
                debug!("Pacing interrupted by cancellation");
            }
        }
    }
}

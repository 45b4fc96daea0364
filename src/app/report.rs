//! Failure log writing
//!
//! At the end of a batch the collected failure records are written, one line
//! per record in accumulation order, to `failed_downloads.log` in the output
//! directory. An earlier log is overwritten.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::app::models::FailureRecord;
use crate::constants::files;
use crate::errors::{BatchError, BatchResult};

/// Writes the end-of-run failure log
#[derive(Debug, Clone)]
pub struct FailureReporter {
    file_name: String,
}

impl Default for FailureReporter {
    fn default() -> Self {
        Self {
            file_name: files::FAILURE_LOG_NAME.to_string(),
        }
    }
}

impl FailureReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the log under `file_name` instead of the default
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Path of the log inside `directory`
    pub fn log_path(&self, directory: &Path) -> PathBuf {
        directory.join(&self.file_name)
    }

    /// Render the records as log content
    pub fn render(failures: &[FailureRecord]) -> String {
        failures
            .iter()
            .map(|failure| format!("{}\n", failure.log_line()))
            .collect()
    }

    /// Write `failures` to the log in `directory` and return the log path
    ///
    /// The file is written even when `failures` is empty.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::Report` if the file cannot be written
    pub async fn report(&self, failures: &[FailureRecord], directory: &Path) -> BatchResult<PathBuf> {
        let path = self.log_path(directory);
        tokio::fs::write(&path, Self::render(failures))
            .await
            .map_err(|source| BatchError::Report {
                path: path.clone(),
                source,
            })?;

        debug!("Failed downloads logged to: {}", path.display());
        Ok(path)
    }
}

//! Batch run summary

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::app::models::{BatchProgress, FailureRecord};

/// Final result of a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    /// Final progress; `completed == total` for a finished run
    pub progress: BatchProgress,
    /// Failures in accumulation order
    pub failures: Vec<FailureRecord>,
    /// Artifacts written, in input order
    pub saved: Vec<PathBuf>,
    /// Failure log, if one was written
    pub failure_log: Option<PathBuf>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall time of the run
    pub elapsed: Duration,
    /// Whether cancellation was requested during the run
    pub cancelled: bool,
}

impl SessionResult {
    /// Check if any request failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One-line summary of the run
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} of {} mods downloaded, {} failed in {}",
            self.saved.len(),
            self.progress.total,
            self.failures.len(),
            format_duration(self.elapsed)
        );
        if self.cancelled {
            summary.push_str(" (cancelled)");
        }
        summary
    }
}

/// Format a duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if total_secs < 3600 {
        format!("{}m{}s", total_secs / 60, total_secs % 60)
    } else {
        format!("{}h{}m", total_secs / 3600, (total_secs % 3600) / 60)
    }
}

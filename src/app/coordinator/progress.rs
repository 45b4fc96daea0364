//! Progress and status line events
//!
//! The coordinator never touches the terminal. It emits `BatchEvent`s over an
//! unbounded channel and whichever surface owns the receiver renders them.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::app::models::BatchProgress;

/// Event emitted by a running batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// `completed` of `total` requests reached a terminal state
    Progress { completed: usize, total: usize },
    /// Human-readable status line
    Log(String),
}

/// Sending half of the batch event channel
///
/// Sends are best effort: if the receiver is gone the batch keeps running and
/// the events are only visible through tracing.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: Option<mpsc::UnboundedSender<BatchEvent>>,
}

impl ProgressReporter {
    /// Create a reporter together with the receiving half
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BatchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Reporter that only logs
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Publish the current progress
    pub fn set_progress(&self, progress: BatchProgress) {
        debug!("Progress {}/{}", progress.completed, progress.total);
        self.send(BatchEvent::Progress {
            completed: progress.completed,
            total: progress.total,
        });
    }

    /// Publish a status line
    pub fn log_line(&self, line: impl Into<String>) {
        let line = line.into();
        info!("{}", line);
        self.send(BatchEvent::Log(line));
    }

    fn send(&self, event: BatchEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                debug!("Batch event receiver dropped");
            }
        }
    }
}

//! Terminal rendering of batch events
//!
//! The display owns all terminal output during a run. On a terminal it shows
//! an indicatif bar with status lines printed above it; otherwise it prints
//! plain lines with a progress line every time the count changes.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::debug;

use crate::app::coordinator::BatchEvent;
use crate::app::models::BatchProgress;

/// Configuration for progress display
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Draw a progress bar when stderr is a terminal
    pub enable_progress_bar: bool,
    /// Suppress status lines and the bar
    pub quiet: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enable_progress_bar: true,
            quiet: false,
        }
    }
}

/// Renders `BatchEvent`s for one run
pub struct ProgressDisplay {
    config: ProgressConfig,
    bar: Option<ProgressBar>,
    is_terminal: bool,
    progress: BatchProgress,
    lines: usize,
}

impl ProgressDisplay {
    /// Create a new progress display with the given configuration
    pub fn new(config: ProgressConfig) -> Self {
        let is_terminal = atty::is(atty::Stream::Stderr);
        Self::with_terminal(config, is_terminal)
    }

    fn with_terminal(config: ProgressConfig, is_terminal: bool) -> Self {
        Self {
            config,
            bar: None,
            is_terminal,
            progress: BatchProgress::default(),
            lines: 0,
        }
    }

    fn bar_enabled(&self) -> bool {
        self.config.enable_progress_bar && self.is_terminal && !self.config.quiet
    }

    fn create_bar(total: usize) -> ProgressBar {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
            .map(|style| style.progress_chars("##-"))
            .unwrap_or_else(|e| {
                debug!("Progress bar template error: {}", e);
                ProgressStyle::default_bar()
            });
        bar.set_style(style);
        bar
    }

    /// Render one event
    pub fn handle(&mut self, event: BatchEvent) {
        match event {
            BatchEvent::Progress { completed, total } => {
                self.progress = BatchProgress { completed, total };
                if self.bar_enabled() {
                    let bar = self.bar.get_or_insert_with(|| Self::create_bar(total));
                    bar.set_position(completed as u64);
                } else if !self.config.quiet && completed > 0 {
                    eprintln!(
                        "Progress: {}/{} ({:.0}%)",
                        completed,
                        total,
                        self.progress.percentage()
                    );
                }
            }
            BatchEvent::Log(line) => {
                self.lines += 1;
                if self.config.quiet {
                    return;
                }
                match &self.bar {
                    Some(bar) => bar.println(line),
                    None => println!("{}", line),
                }
            }
        }
    }

    /// Render events until the sender side is dropped
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<BatchEvent>) -> Self {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        self.finish();
        self
    }

    /// Clear the bar, leaving printed lines in place
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    /// Last progress seen
    pub fn progress(&self) -> BatchProgress {
        self.progress
    }

    /// Number of status lines received
    pub fn lines_received(&self) -> usize {
        self.lines
    }
}

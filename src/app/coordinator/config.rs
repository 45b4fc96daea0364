//! Configuration structures for the batch coordinator
//!
//! `CoordinatorConfig` holds the tunables of the sequential pipeline, while
//! `BatchConfig` describes one run: what to read, where to write and which
//! loader and game version every entry must be compatible with.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::limits;
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the batch coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Pause after each entry that reached the index
    pub pacing_delay: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            pacing_delay: Duration::from_millis(limits::PACING_DELAY_MS),
        }
    }
}

impl CoordinatorConfig {
    /// Set the pause between index lookups
    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    /// Validate the configuration
    ///
    /// A zero pacing delay is allowed; the index rate limiter still applies.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.pacing_delay > Duration::from_secs(60) {
            return Err(ConfigError::InvalidValue {
                field: "batch.pacing_delay_ms".to_string(),
                value: self.pacing_delay.as_millis().to_string(),
                reason: "Pacing delay cannot exceed 60 seconds".to_string(),
            });
        }
        Ok(())
    }
}

/// Parameters of one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// JSON mod list to read
    pub input_path: PathBuf,
    /// Directory receiving artifacts, sidecars and the failure log
    pub output_dir: PathBuf,
    /// Loader every artifact must support, e.g. `fabric`
    pub loader: String,
    /// Game version every artifact must support, e.g. `1.21.1`
    pub game_version: String,
}

impl BatchConfig {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        loader: impl Into<String>,
        game_version: impl Into<String>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            loader: loader.into(),
            game_version: game_version.into(),
        }
    }
}

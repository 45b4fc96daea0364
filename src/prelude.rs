//! Prelude module for mod_fetcher
//!
//! Re-exports the items needed to assemble and run a batch with a single
//! `use mod_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use mod_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let runtime = AppConfig::default().to_runtime_config()?;
//!     let resolver = ArtifactResolver::new(IndexClient::with_config(runtime.client)?);
//!     let fetcher = StreamingFetcher::new(runtime.fetcher)?;
//!     let (reporter, _events) = ProgressReporter::channel();
//!
//!     let coordinator = Coordinator::new(runtime.coordinator, resolver, fetcher, reporter);
//!     let batch = BatchConfig::new("mods.json", "mods", "fabric", "1.21.1");
//!     let session = coordinator.run(&batch).await?;
//!     println!("{}", session.summary());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Pipeline components
pub use crate::app::{
    ArtifactResolver, BatchConfig, BatchEvent, ClientConfig, Coordinator, CoordinatorConfig,
    FailureRecord, FetcherConfig, IndexClient, ProgressReporter, ResolvedArtifact,
    SessionResult, StreamingFetcher,
};

// Configuration
pub use crate::config::{AppConfig, RuntimeConfig};

// Commonly used constants
pub use crate::constants::{DEFAULT_RATE_LIMIT_RPS, FAILURE_LOG_NAME, USER_AGENT};

pub use std::path::{Path, PathBuf};

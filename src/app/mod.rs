//! Core application logic for mod_fetcher
//!
//! This module contains the batch pipeline: mod list loading, index
//! resolution, streaming artifact download, failure reporting and the
//! coordinator tying them together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mod_fetcher::app::{ArtifactResolver, IndexClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = ArtifactResolver::new(IndexClient::new()?);
//! let artifact = resolver.resolve("sodium", "fabric", "1.21.1").await?;
//! println!(
//!     "{} -> {}",
//!     artifact.artifact_file_name("sodium"),
//!     artifact.download_url
//! );
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod coordinator;
pub mod models;
pub mod modlist;
pub mod report;
pub mod resolver;

// Re-export main public API
pub use client::{ClientConfig, FetcherConfig, IndexClient, StreamingFetcher};
pub use coordinator::{
    BatchConfig, BatchEvent, Coordinator, CoordinatorConfig, ProgressReporter, SessionResult,
    SignalHandler,
};
pub use models::{
    ArtifactMetadata, BatchProgress, DownloadOutcome, FailureRecord, ModRequest, ResolvedArtifact,
};
pub use modlist::{load_mod_list, parse_mod_list};
pub use report::FailureReporter;
pub use resolver::ArtifactResolver;

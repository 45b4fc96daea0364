//! mod_fetcher Library
//!
//! Resolves a JSON list of Minecraft mods against the Modrinth index and
//! downloads a compatible artifact for each, with retry on transient network
//! failures, a metadata sidecar per artifact and a log of every failure.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

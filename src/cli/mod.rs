//! Command-line interface components
//!
//! This module contains CLI-specific code for the mod_fetcher application,
//! including argument parsing, progress display, and command handlers.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, Commands, ConfigAction, ConfigArgs, DownloadArgs, GlobalArgs, ResolveArgs};
pub use commands::{handle_config, handle_download, handle_resolve};
pub use progress::{ProgressConfig, ProgressDisplay};

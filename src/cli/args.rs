//! Command-line argument parsing for mod_fetcher
//!
//! This module defines the CLI structure using clap derive macros: the batch
//! download, a resolve-only lookup, and config file management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// mod_fetcher - Download Minecraft mods from a JSON list
#[derive(Parser, Debug)]
#[command(
    name = "mod_fetcher",
    version,
    about = "Resolve and download mods compatible with a loader and game version",
    long_about = "Reads a JSON list of mods, looks each one up on the Modrinth index, and downloads
the first version compatible with the chosen loader and game version. Failures are collected
into failed_downloads.log in the output directory."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every mod in a JSON list
    Download(DownloadArgs),

    /// Look up mods on the index without downloading
    Resolve(ResolveArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the download command
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// JSON file containing a list of {"name": ..., "url"?: ...} objects
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Directory receiving the downloaded mods
    #[arg(short, long, value_name = "DIR", default_value = "mods")]
    pub output: PathBuf,

    /// Mod loader, e.g. fabric, forge, neoforge, quilt
    #[arg(short, long)]
    pub loader: Option<String>,

    /// Minecraft version, e.g. 1.21.1
    #[arg(short, long = "game-version", value_name = "VERSION")]
    pub game_version: String,
}

/// Arguments for the resolve command
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Mod loader, e.g. fabric, forge, neoforge, quilt
    #[arg(short, long)]
    pub loader: Option<String>,

    /// Minecraft version, e.g. 1.21.1
    #[arg(short, long = "game-version", value_name = "VERSION")]
    pub game_version: String,

    /// Mod names to look up
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,
}

/// Arguments for config management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a commented default config file to the user config directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Logging level chosen by the verbosity flags, if any was given
    pub fn log_level_override(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        self.log_level_override().unwrap_or(tracing::Level::WARN)
    }
}

impl DownloadArgs {
    /// Check the arguments before any network access
    pub fn validate(&self) -> Result<(), String> {
        if self.game_version.trim().is_empty() {
            return Err("Game version cannot be empty".to_string());
        }
        if matches!(&self.loader, Some(loader) if loader.trim().is_empty()) {
            return Err("Loader cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_download_args_parsing() {
        let cli = Cli::try_parse_from([
            "mod_fetcher",
            "download",
            "--input",
            "mods.json",
            "--game-version",
            "1.21.1",
            "-l",
            "fabric",
        ])
        .unwrap();

        match cli.command {
            Commands::Download(args) => {
                assert_eq!(args.input, PathBuf::from("mods.json"));
                assert_eq!(args.output, PathBuf::from("mods"));
                assert_eq!(args.loader.as_deref(), Some("fabric"));
                assert_eq!(args.game_version, "1.21.1");
                assert!(args.validate().is_ok());
            }
            other => panic!("Expected download command, got {:?}", other),
        }
    }

    #[test]
    fn test_download_requires_game_version() {
        let result = Cli::try_parse_from(["mod_fetcher", "download", "--input", "mods.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_download_args_validation() {
        let mut args = DownloadArgs {
            input: PathBuf::from("mods.json"),
            output: PathBuf::from("mods"),
            loader: None,
            game_version: "1.21.1".to_string(),
        };
        assert!(args.validate().is_ok());

        args.loader = Some(" ".to_string());
        assert!(args.validate().is_err());

        args.loader = None;
        args.game_version = String::new();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_resolve_args_parsing() {
        let cli = Cli::try_parse_from([
            "mod_fetcher",
            "resolve",
            "--game-version",
            "1.20.1",
            "sodium",
            "lithium",
        ])
        .unwrap();

        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.names, vec!["sodium", "lithium"]);
                assert!(args.loader.is_none());
            }
            other => panic!("Expected resolve command, got {:?}", other),
        }

        assert!(Cli::try_parse_from(["mod_fetcher", "resolve", "-g", "1.20.1"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::try_parse_from(["mod_fetcher", "--quiet", "config", "show"]).unwrap();
        assert_eq!(cli.log_level(), tracing::Level::ERROR);

        let cli = Cli::try_parse_from(["mod_fetcher", "config", "show", "-v"]).unwrap();
        assert_eq!(cli.log_level(), tracing::Level::INFO);

        let cli = Cli::try_parse_from(["mod_fetcher", "--very-verbose", "config", "init"]).unwrap();
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);

        let cli = Cli::try_parse_from(["mod_fetcher", "config", "show"]).unwrap();
        assert_eq!(cli.log_level_override(), None);
        assert_eq!(cli.log_level(), tracing::Level::WARN);
    }
}

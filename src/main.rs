//! mod_fetcher CLI application
//!
//! Command-line interface for resolving and downloading mods listed in a JSON
//! file against the Modrinth index.

use std::process;

use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use mod_fetcher::cli::{handle_config, handle_download, handle_resolve, Cli, Commands, ConfigAction};
use mod_fetcher::config::AppConfig;
use mod_fetcher::constants::logging::LOG_TARGET;
use mod_fetcher::errors::Result;

/// Exit status when the command ran but some items failed
const EXIT_PARTIAL_FAILURE: i32 = 2;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => process::exit(EXIT_PARTIAL_FAILURE),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Main application logic
async fn run() -> Result<bool> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    let initializing = matches!(
        &cli.command,
        Commands::Config(args) if matches!(args.action, ConfigAction::Init { .. })
    );
    let config = match AppConfig::load(cli.global.config.clone()).await {
        Ok(config) => config,
        // A broken config file must not prevent writing a fresh one
        Err(e) if initializing => {
            eprintln!("Ignoring unreadable configuration: {}", e);
            AppConfig::default()
        }
        Err(e) => return Err(e.into()),
    };

    init_logging(&cli, &config);

    info!("mod_fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    let quiet = cli.global.quiet;
    match cli.command {
        Commands::Download(args) => {
            info!("Executing download command");
            handle_download(args, &config, quiet).await
        }
        Commands::Resolve(args) => {
            info!("Executing resolve command");
            handle_resolve(args, &config).await
        }
        Commands::Config(args) => {
            info!("Executing config command");
            handle_config(args, &config).await
        }
    }
}

/// Initialize logging from the CLI flags, falling back to the config file level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let config_level = config.logging.level.parse::<tracing::Level>();
    let log_level = cli
        .log_level_override()
        .or_else(|| config_level.as_ref().ok().copied())
        .unwrap_or_else(|| cli.log_level());

    let mut filter = EnvFilter::from_default_env();
    match format!("{}={}", LOG_TARGET, log_level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Invalid log directive: {}", e),
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .with_writer(std::io::stderr)
        .init();

    if config_level.is_err() {
        warn!(
            "Unknown log level '{}' in configuration, using {}",
            config.logging.level, log_level
        );
    }
    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}

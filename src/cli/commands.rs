//! Command handlers for mod_fetcher CLI
//!
//! Each handler returns `Ok(true)` when every item succeeded and `Ok(false)`
//! when the command ran but some items failed.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::{
    ArtifactResolver, BatchConfig, Coordinator, IndexClient, ProgressReporter, SignalHandler,
    StreamingFetcher,
};
use crate::cli::{ConfigAction, ConfigArgs, DownloadArgs, ProgressConfig, ProgressDisplay, ResolveArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, BatchError, Result};

/// Handle the download command
///
/// The batch runs on its own task while this task renders its events. Ctrl-C
/// cancels the batch; entries not yet processed are recorded as failures.
pub async fn handle_download(args: DownloadArgs, config: &AppConfig, quiet: bool) -> Result<bool> {
    args.validate().map_err(AppError::generic)?;
    let runtime = config.to_runtime_config()?;

    let loader = args
        .loader
        .clone()
        .unwrap_or_else(|| config.batch.default_loader.clone());
    let batch = BatchConfig::new(args.input, args.output, loader, args.game_version);
    info!(
        "Downloading mods from {} for {} {}",
        batch.input_path.display(),
        batch.loader,
        batch.game_version
    );

    let resolver = ArtifactResolver::new(IndexClient::with_config(runtime.client)?);
    let fetcher = StreamingFetcher::new(runtime.fetcher)?;
    let (reporter, events) = ProgressReporter::channel();
    let cancel = CancellationToken::new();
    let coordinator = Coordinator::new(runtime.coordinator, resolver, fetcher, reporter)
        .with_cancellation(cancel.clone());

    let signal_task = SignalHandler::new(cancel).setup();
    let display = ProgressDisplay::new(ProgressConfig {
        enable_progress_bar: true,
        quiet,
    });
    let display_task = tokio::spawn(display.run(events));
    let batch_task = tokio::spawn(async move { coordinator.run(&batch).await });

    let joined = batch_task.await;
    signal_task.abort();
    if let Err(e) = display_task.await {
        debug!("Progress display task ended abnormally: {}", e);
    }

    let session = joined.map_err(|e| BatchError::Worker(e.to_string()))??;

    if !quiet {
        println!("{}", session.summary());
    }
    if session.cancelled {
        warn!("Batch was cancelled before completion");
    }

    Ok(!session.has_failures())
}

/// Handle the resolve command
pub async fn handle_resolve(args: ResolveArgs, config: &AppConfig) -> Result<bool> {
    let runtime = config.to_runtime_config()?;
    let loader = args
        .loader
        .unwrap_or_else(|| config.batch.default_loader.clone());
    let resolver = ArtifactResolver::new(IndexClient::with_config(runtime.client)?);

    let mut all_resolved = true;
    for name in &args.names {
        match resolver.resolve(name, &loader, &args.game_version).await {
            Ok(artifact) => println!(
                "{}: {} -> {} ({})",
                name,
                artifact.version_label,
                artifact.download_url,
                artifact.artifact_file_name(name)
            ),
            Err(e) => {
                all_resolved = false;
                println!("{}: {}", name, e);
            }
        }
    }

    Ok(all_resolved)
}

/// Handle the config command
pub async fn handle_config(args: ConfigArgs, config: &AppConfig) -> Result<bool> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml_string()?);
        }
        ConfigAction::Init { force } => {
            let (path, written) = AppConfig::initialize(force).await?;
            if written {
                println!("Created default configuration file:");
                println!("   {}", path.display());
                println!("   You can customize settings by editing this file.");
            } else {
                println!(
                    "Configuration file already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }
        }
    }
    Ok(true)
}

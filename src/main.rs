// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use certsync::cli::{Cli, Command};
use certsync::config::Config;
use certsync::constants::env;
use certsync::local::{PathMapping, VersionStore};
use certsync::sync::SyncEngine;
use certsync::vault::VaultClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    init_tracing(&config, cli.verbose)?;

    let client = Arc::new(VaultClient::from_config(&config)?);
    let engine = SyncEngine::from_config(client, &config);
    info!("Using store at {}", config.vault_url);

    match &cli.command {
        Command::Fetch { watch } => {
            let versions = VersionStore::new(&config.paths_file);
            fetch(&engine, &versions).await?;

            if *watch {
                info!(
                    "Watching for changes every {}s",
                    config.check_interval.as_secs()
                );
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep(config.check_interval) => {
                            fetch(&engine, &versions).await?;
                        }
                        _ = tokio::signal::ctrl_c() => {
                            info!("Interrupted, stopping");
                            break;
                        }
                    }
                }
            }
        }
        Command::Push(args) => {
            let request = args.to_request();
            let paths = PathMapping::load(&config.path_map_file, &config.default_vault_path);
            engine
                .push(&request, &paths)
                .await
                .with_context(|| format!("Failed to push certificate for {}", request.domain))?;
        }
    }

    Ok(())
}

/// One pull run. Only a failure to persist the version file is fatal.
async fn fetch(engine: &SyncEngine, versions: &VersionStore) -> Result<()> {
    let report = engine.pull(versions).await.map_err(|e| {
        error!("Failed to save {}: {}", versions.path().display(), e);
        e
    })?;
    if report.failed() > 0 {
        info!("{} domains failed, see errors above", report.failed());
    }
    Ok(())
}

fn init_tracing(config: &Config, verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "certsync=debug"
    } else {
        "certsync=info"
    };
    let env_filter = EnvFilter::try_from_env(env::LOG_FILTER)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

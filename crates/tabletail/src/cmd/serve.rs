//! Serve command - run the change-stream consumer
//!
//! Discovers the change stream of every configured table and polls its
//! shards until the process is stopped. Records are printed as JSON lines on
//! stdout.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::signal;
use tracing::info;

use tabletail_client::{HttpClient, PrefixResolver};
use tabletail_config::Config;
use tabletail_consumer::{ConsumerSettings, StdoutDispatcher, StreamConsumer, TableTarget};

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file (defaults to configs/tabletail.toml if not specified)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        "tabletail starting"
    );

    let config = load_config(args.config)?;

    info!(
        endpoint = %config.endpoint.url,
        tables = config.tables.len(),
        poll_interval_ms = config.consumer.poll_interval_ms,
        "configuration loaded"
    );

    let client = Arc::new(
        HttpClient::new(&config.endpoint.url, &config.endpoint.region)
            .context("failed to create endpoint client")?,
    );
    let resolver = Arc::new(PrefixResolver::new(config.consumer.table_prefix.clone()));
    let dispatcher = Arc::new(StdoutDispatcher::new());

    let targets = config
        .tables
        .iter()
        .map(|t| match &t.physical_name {
            Some(physical) => TableTarget::with_physical(&t.name, physical),
            None => TableTarget::new(&t.name),
        })
        .collect();

    let settings = ConsumerSettings {
        poll_interval: Duration::from_millis(config.consumer.poll_interval_ms),
        retry_delay: Duration::from_millis(config.consumer.retry_delay_ms),
        retry_limit: config.consumer.retry_limit,
    };

    let consumer = StreamConsumer::new(client, dispatcher, resolver, targets, settings);
    consumer.run().await;

    if config.tables.is_empty() {
        return Ok(());
    }

    // Pollers are detached tasks; the process carries them until ctrl-c
    info!("discovery settled; polling until ctrl-c");
    signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("shutting down");

    Ok(())
}

/// Load configuration, trying default paths when none is given
fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            // User explicitly provided config path - must exist
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            Config::from_file(&path).context("failed to load configuration")
        }
        None => {
            let default_paths = [
                PathBuf::from("configs/tabletail.toml"),
                PathBuf::from("tabletail.toml"),
            ];

            for path in &default_paths {
                if path.exists() {
                    info!(config = %path.display(), "using config file");
                    return Config::from_file(path).context("failed to load configuration");
                }
            }

            info!("no config file found; using defaults");
            Ok(Config::default())
        }
    }
}

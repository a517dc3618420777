//! Tabletail - Local change-stream consumer
//!
//! # Usage
//!
//! ```bash
//! # Run the consumer (default)
//! tabletail
//! tabletail --config configs/tabletail.toml
//!
//! # One-shot stream inspection for a table
//! tabletail describe orders
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tabletail_config::Config;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Tabletail - Local change-stream consumer
#[derive(Parser, Debug)]
#[command(name = "tabletail")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the consumer
    Serve(cmd::serve::ServeArgs),

    /// Describe a table's change stream and exit
    Describe(cmd::describe::DescribeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve(mut args)) => {
            if args.config.is_none() && cli.config.is_some() {
                args.config = cli.config;
            }
            let log_level = resolve_log_level(cli.log_level.as_deref(), args.config.as_deref());
            init_logging(&log_level)?;
            cmd::serve::run(args).await
        }
        Some(Command::Describe(args)) => {
            // Describe just prints to stdout; keep logging quiet unless asked
            let log_level = cli.log_level.unwrap_or_else(|| "warn".to_string());
            init_logging(&log_level)?;
            cmd::describe::run(args).await
        }
        // No subcommand = run the consumer (default behavior)
        None => {
            let log_level = resolve_log_level(cli.log_level.as_deref(), cli.config.as_deref());
            init_logging(&log_level)?;
            let args = cmd::serve::ServeArgs { config: cli.config };
            cmd::serve::run(args).await
        }
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config_path: Option<&std::path::Path>) -> String {
    if let Some(level) = cli_level {
        return level.to_string();
    }

    if let Some(path) = config_path
        && path.exists()
        && let Ok(config) = Config::from_file(path)
    {
        return config.log.level.as_str().to_string();
    }

    "info".to_string()
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}

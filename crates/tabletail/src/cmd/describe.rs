//! Describe command - one-shot stream inspection
//!
//! Resolves a table, reports whether its change stream is enabled, and lists
//! the stream's shards as JSON on stdout. Does not enable anything.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use tabletail_client::{HttpClient, PrefixResolver, StreamApi, TableApi, TableResolver};
use tabletail_config::Config;

/// Describe command arguments
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Logical table name
    #[arg(value_name = "TABLE")]
    table: String,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Run the describe command
pub async fn run(args: DescribeArgs) -> Result<()> {
    let config = match args.config {
        Some(path) => Config::from_file(&path).context("failed to load configuration")?,
        None => Config::default(),
    };

    let client = HttpClient::new(&config.endpoint.url, &config.endpoint.region)
        .context("failed to create endpoint client")?;
    let resolver = PrefixResolver::new(config.consumer.table_prefix.clone());

    let physical = resolver.resolve(&args.table);
    let description = client
        .describe_table(&physical)
        .await
        .with_context(|| format!("failed to describe table '{}'", physical))?;

    let output = match &description.stream_id {
        Some(stream) => {
            let shards = client
                .describe_stream(stream)
                .await
                .context("failed to describe stream")?;
            serde_json::json!({
                "table": args.table,
                "physicalName": physical,
                "streamEnabled": true,
                "streamId": stream.as_str(),
                "shards": shards.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            })
        }
        None => serde_json::json!({
            "table": args.table,
            "physicalName": physical,
            "streamEnabled": false,
        }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

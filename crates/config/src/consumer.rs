//! Consumer tunables and the watched-table list
//!
//! # Example
//!
//! ```toml
//! [consumer]
//! poll_interval_ms = 10000
//! retry_limit = 3
//!
//! [[tables]]
//! name = "orders"
//! ```

use serde::Deserialize;

/// Polling and retry settings for the stream consumer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Delay between record reads on each shard (milliseconds)
    /// Default: 10000
    pub poll_interval_ms: u64,

    /// Shared retry budget for discovery failures across all tables
    /// Default: 3
    pub retry_limit: u32,

    /// Fixed delay before a discovery or iterator retry (milliseconds)
    /// Independent of the polling interval. Default: 3000
    pub retry_delay_ms: u64,

    /// Prefix prepended to logical table names to form physical names
    /// (e.g. an app/stage namespace). Tables with an explicit
    /// `physical_name` skip the prefix.
    pub table_prefix: Option<String>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
            retry_limit: 3,
            retry_delay_ms: 3_000,
            table_prefix: None,
        }
    }
}

/// A single table whose change stream should be consumed
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Logical table name, used in logs and handed to the dispatcher
    pub name: String,

    /// Full physical table name at the storage endpoint
    /// Default: `table_prefix` + `name`
    pub physical_name: Option<String>,
}

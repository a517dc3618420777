//! Tabletail - Consumer
//!
//! The shard-discovery-and-polling state machine. Given a set of tables,
//! discovery resolves each table's change stream (enabling it on demand),
//! enumerates shards, acquires a LATEST iterator per shard, and spawns one
//! polling task per shard. Pollers forward every non-empty batch to a
//! [`Dispatcher`] and reschedule themselves forever.
//!
//! Failure handling is deliberately local: every failure is logged at the
//! layer that detects it and decides only whether to retry, stop, or carry
//! on. Nothing propagates to the host as a structured error - it observes log
//! output and polling activity.
//!
//! # Example
//!
//! ```ignore
//! use tabletail_consumer::{ConsumerSettings, StreamConsumer, StdoutDispatcher, TableTarget};
//! use tabletail_client::{HttpClient, PrefixResolver};
//! use std::sync::Arc;
//!
//! let client = Arc::new(HttpClient::new("http://localhost:8000", "local")?);
//! let consumer = StreamConsumer::new(
//!     client,
//!     Arc::new(StdoutDispatcher::new()),
//!     Arc::new(PrefixResolver::default()),
//!     vec![TableTarget::new("orders")],
//!     ConsumerSettings::default(),
//! );
//! consumer.run().await;
//! ```

mod consumer;
mod discovery;
mod dispatch;
mod error;
mod iterator;
mod poller;
mod state;

pub use consumer::{ConsumerSettings, StreamConsumer};
pub use discovery::{StreamDiscovery, TableTarget};
pub use dispatch::{ChannelDispatcher, DeliveredBatch, Dispatcher, StdoutDispatcher};
pub use error::DiscoveryError;
pub use poller::ShardPoller;
pub use state::{ConsumerState, RetryBudget, SuccessCounter};

#[cfg(test)]
mod consumer_test;

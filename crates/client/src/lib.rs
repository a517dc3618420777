//! Tabletail - Client
//!
//! Transport for the two external APIs the consumer talks to: the
//! storage-table management API (describe a table, enable its change stream)
//! and the stream read API (list shards, acquire iterators, read records).
//!
//! The consumer core only sees the [`TableApi`] and [`StreamApi`] traits.
//! Two implementations live here:
//!
//! - [`HttpClient`] - speaks the local JSON wire protocol over HTTP
//! - [`MockClient`] - scripted in-memory responses for tests

mod error;
mod http;
mod mock;
mod traits;
mod types;

pub use error::ClientError;
pub use http::HttpClient;
pub use mock::{MockCalls, MockClient};
pub use traits::{PrefixResolver, StreamApi, TableApi, TableResolver};
pub use types::{ChangeRecord, IteratorToken, RecordBatch, ShardId, StreamId, TableDescription};

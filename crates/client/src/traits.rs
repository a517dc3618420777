//! Trait boundaries for the external APIs
//!
//! The consumer core is generic over these, so tests can substitute the
//! scripted [`MockClient`](crate::MockClient) for the HTTP transport.

use crate::error::ClientError;
use crate::types::{IteratorToken, RecordBatch, ShardId, StreamId, TableDescription};

/// Storage-table management API
pub trait TableApi: Send + Sync {
    /// Fetch table metadata, including its change-stream id if enabled
    fn describe_table(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = Result<TableDescription, ClientError>> + Send;

    /// Enable a change stream on the table with the new-and-old-images view
    fn enable_stream(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = Result<(), ClientError>> + Send;
}

/// Stream read API
pub trait StreamApi: Send + Sync {
    /// List the shards of a stream
    fn describe_stream(
        &self,
        stream: &StreamId,
    ) -> impl std::future::Future<Output = Result<Vec<ShardId>, ClientError>> + Send;

    /// Acquire a LATEST position token for a shard
    ///
    /// `Ok(None)` means the call succeeded but the source had no iterator to
    /// give (shard still initializing). All retry decisions are the caller's.
    fn get_iterator(
        &self,
        stream: &StreamId,
        shard: &ShardId,
    ) -> impl std::future::Future<Output = Result<Option<IteratorToken>, ClientError>> + Send;

    /// Read the next batch of records at `token`
    fn get_records(
        &self,
        token: &IteratorToken,
    ) -> impl std::future::Future<Output = Result<RecordBatch, ClientError>> + Send;
}

/// Resolution of a logical table name to its physical storage name
pub trait TableResolver: Send + Sync {
    fn resolve(&self, logical: &str) -> String;
}

/// Resolver that prepends a fixed namespace prefix
///
/// With no prefix, logical and physical names are the same.
#[derive(Debug, Clone, Default)]
pub struct PrefixResolver {
    prefix: Option<String>,
}

impl PrefixResolver {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }
}

impl TableResolver for PrefixResolver {
    fn resolve(&self, logical: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, logical),
            None => logical.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_resolver_no_prefix() {
        let resolver = PrefixResolver::default();
        assert_eq!(resolver.resolve("orders"), "orders");
    }

    #[test]
    fn test_prefix_resolver_with_prefix() {
        let resolver = PrefixResolver::new(Some("myapp-staging-".into()));
        assert_eq!(resolver.resolve("orders"), "myapp-staging-orders");
    }
}

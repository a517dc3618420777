//! Discovery failure taxonomy
//!
//! These never escape the consumer - every variant is logged where it is
//! handled and decides only whether discovery retries, stops, or shrugs.

use tabletail_client::ClientError;
use thiserror::Error;

/// Outcome of a failed discovery attempt for one table
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The table does not exist at the endpoint; operator must create it
    /// out-of-band. Terminal for this run.
    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    /// The stream is not enabled yet, has no shards, or no shard yielded an
    /// iterator. Retryable.
    #[error("shards awaiting init for table '{0}'")]
    ShardsAwaitingInit(String),

    /// The stream call was missing its iterator parameter - the stream is
    /// still seeding. Retryable, same remediation as awaiting-init.
    #[error("missing iterator for table '{0}': {1}")]
    MissingIterator(String, ClientError),

    /// Anything else; logged verbatim and otherwise ignored
    #[error("{0}")]
    Transport(ClientError),
}

impl DiscoveryError {
    /// Classify a transport failure for a given table
    pub fn classify(table: &str, err: ClientError) -> Self {
        if err.is_resource_not_found() {
            Self::TableNotFound(table.to_string())
        } else if err.is_missing_iterator() {
            Self::MissingIterator(table.to_string(), err)
        } else {
            Self::Transport(err)
        }
    }

    /// Whether the shared retry budget applies to this failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ShardsAwaitingInit(_) | Self::MissingIterator(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found_is_terminal() {
        let err = DiscoveryError::classify(
            "orders",
            ClientError::api("ResourceNotFoundException", "gone"),
        );
        assert!(matches!(err, DiscoveryError::TableNotFound(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_classify_missing_iterator_is_retryable() {
        let err = DiscoveryError::classify(
            "orders",
            ClientError::api(
                "MissingRequiredParameter",
                "Missing required key 'ShardIterator' in params",
            ),
        );
        assert!(matches!(err, DiscoveryError::MissingIterator(..)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_other_is_unclassified() {
        let err = DiscoveryError::classify("orders", ClientError::api("InternalFailure", "boom"));
        assert!(matches!(err, DiscoveryError::Transport(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_awaiting_init_is_retryable() {
        assert!(DiscoveryError::ShardsAwaitingInit("orders".into()).is_retryable());
    }
}

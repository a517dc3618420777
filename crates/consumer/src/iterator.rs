//! Shard iterator acquisition
//!
//! Thin by design: requests a LATEST position token and reports `None` when
//! the source had none to give. All retry decisions belong to discovery.

use tabletail_client::{ClientError, IteratorToken, ShardId, StreamApi, StreamId};
use tracing::debug;

/// Acquire a LATEST iterator for one shard
///
/// Transport failures propagate to the caller, which folds
/// missing-iterator-parameter errors into the retryable discovery path.
pub(crate) async fn acquire_latest<C: StreamApi>(
    client: &C,
    stream: &StreamId,
    shard: &ShardId,
) -> Result<Option<IteratorToken>, ClientError> {
    let token = client.get_iterator(stream, shard).await?;
    if token.is_none() {
        debug!(stream = %stream, shard = %shard, "no iterator available yet");
    }
    Ok(token)
}

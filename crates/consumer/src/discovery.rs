//! Stream discovery
//!
//! Runs once per configured table at startup and on every retry: resolve the
//! physical table name, make sure a change stream is enabled, enumerate
//! shards, acquire an iterator per unseen shard and spawn its poller. Each
//! poller runs in its own tokio task so one slow shard never blocks another.

use crate::error::DiscoveryError;
use crate::iterator;
use crate::poller::ShardPoller;
use crate::state::ConsumerState;
use crate::{ConsumerSettings, Dispatcher};
use std::sync::Arc;
use tabletail_client::{IteratorToken, ShardId, StreamApi, TableApi, TableResolver};
use tracing::{debug, error, info, warn};

/// One table to watch
#[derive(Debug, Clone)]
pub struct TableTarget {
    /// Logical table name, used in logs and handed to the dispatcher
    pub name: String,
    /// Explicit physical name; when absent the resolver derives one
    pub physical: Option<String>,
}

impl TableTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            physical: None,
        }
    }

    pub fn with_physical(name: impl Into<String>, physical: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            physical: Some(physical.into()),
        }
    }
}

/// Discovery state machine for one consumer instance
pub struct StreamDiscovery<C, D, R> {
    client: Arc<C>,
    dispatcher: Arc<D>,
    resolver: Arc<R>,
    state: Arc<ConsumerState>,
    settings: ConsumerSettings,
}

impl<C, D, R> StreamDiscovery<C, D, R>
where
    C: TableApi + StreamApi + 'static,
    D: Dispatcher + 'static,
    R: TableResolver,
{
    pub fn new(
        client: Arc<C>,
        dispatcher: Arc<D>,
        resolver: Arc<R>,
        state: Arc<ConsumerState>,
        settings: ConsumerSettings,
    ) -> Self {
        Self {
            client,
            dispatcher,
            resolver,
            state,
            settings,
        }
    }

    /// Shared state bundle, exposed for the host and for tests
    pub fn state(&self) -> &Arc<ConsumerState> {
        &self.state
    }

    /// Discover a table's stream, retrying on the shared budget
    ///
    /// Returns when discovery succeeded, failed terminally, or the budget ran
    /// out. Pollers spawned along the way keep running regardless.
    pub async fn run_for_table(&self, target: &TableTarget) {
        info!(table = %target.name, "connecting to change stream");

        loop {
            match self.discover(target).await {
                Ok(()) => return,
                Err(e) if e.is_retryable() => {
                    let remaining = self.state.budget.remaining();
                    if remaining == 0 {
                        warn!(
                            table = %target.name,
                            "stream never became ready; giving up discovery"
                        );
                        return;
                    }
                    warn!(
                        table = %target.name,
                        remaining,
                        "stream not enabled or table still seeding; will retry"
                    );
                    self.state.budget.consume();
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
                Err(DiscoveryError::TableNotFound(table)) => {
                    error!(
                        table = %table,
                        "table does not exist; create it at the endpoint (with stream support) and restart"
                    );
                    return;
                }
                Err(e) => {
                    // Unclassified; logged verbatim, no retry
                    error!(table = %target.name, error = %e, "stream discovery failed");
                    return;
                }
            }
        }
    }

    /// One discovery attempt
    ///
    /// A fresh table/stream binding is built every time; nothing is carried
    /// over from prior attempts except the seen-shard set.
    async fn discover(&self, target: &TableTarget) -> Result<(), DiscoveryError> {
        let logical = &target.name;
        let physical = target
            .physical
            .clone()
            .unwrap_or_else(|| self.resolver.resolve(logical));

        let mut description = self
            .client
            .describe_table(&physical)
            .await
            .map_err(|e| DiscoveryError::classify(logical, e))?;

        if !description.stream_enabled() {
            debug!(table = %logical, "no stream configured; enabling");
            self.client
                .enable_stream(&physical)
                .await
                .map_err(|e| DiscoveryError::classify(logical, e))?;
            description = self
                .client
                .describe_table(&physical)
                .await
                .map_err(|e| DiscoveryError::classify(logical, e))?;
        }

        let Some(stream) = description.stream_id else {
            // Enable was acked but the stream has not surfaced yet
            return Err(DiscoveryError::ShardsAwaitingInit(logical.clone()));
        };

        let shards = self
            .client
            .describe_stream(&stream)
            .await
            .map_err(|e| DiscoveryError::classify(logical, e))?;
        debug!(table = %logical, stream = %stream, shards = shards.len(), "described stream");

        let mut acquired = Vec::with_capacity(shards.len());
        for shard in shards {
            let token = iterator::acquire_latest(self.client.as_ref(), &stream, &shard)
                .await
                .map_err(|e| DiscoveryError::classify(logical, e))?;

            match token {
                Some(token) => {
                    // Claim before spawn; a shard already seen by an earlier
                    // attempt still counts as a success but gets no second
                    // poller.
                    if self.state.claim_shard(&shard) {
                        self.spawn_poller(logical, &shard, token);
                    }
                    acquired.push(true);
                }
                None => acquired.push(false),
            }
        }

        // Zero shards counts as nothing acquired
        if !acquired.iter().any(|ok| *ok) {
            return Err(DiscoveryError::ShardsAwaitingInit(logical.clone()));
        }

        Ok(())
    }

    fn spawn_poller(&self, table: &str, shard: &ShardId, seed: IteratorToken) {
        info!(table, shard = %shard, "starting shard poller");

        let poller = ShardPoller::new(
            table.to_string(),
            shard.clone(),
            Arc::clone(&self.client),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.state),
            self.settings.clone(),
        );
        tokio::spawn(poller.run(seed));
    }
}

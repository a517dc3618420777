//! Consumer entry point
//!
//! Spawns one discovery task per configured table and waits for discovery to
//! settle. Shard pollers are detached tasks that keep running for the life of
//! the process after `run` returns.

use crate::discovery::{StreamDiscovery, TableTarget};
use crate::dispatch::Dispatcher;
use crate::state::ConsumerState;
use std::sync::Arc;
use std::time::Duration;
use tabletail_client::{StreamApi, TableApi, TableResolver};
use tracing::{error, info};

/// Polling and retry tunables for one consumer instance
#[derive(Debug, Clone)]
pub struct ConsumerSettings {
    /// Delay between record reads on each shard
    pub poll_interval: Duration,
    /// Fixed delay before a discovery or iterator retry
    pub retry_delay: Duration,
    /// Initial value of the shared retry budget
    pub retry_limit: u32,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10_000),
            retry_delay: Duration::from_millis(3_000),
            retry_limit: 3,
        }
    }
}

/// Change-stream consumer for a set of tables
pub struct StreamConsumer<C, D, R> {
    discovery: Arc<StreamDiscovery<C, D, R>>,
    tables: Vec<TableTarget>,
}

impl<C, D, R> StreamConsumer<C, D, R>
where
    C: TableApi + StreamApi + 'static,
    D: Dispatcher + 'static,
    R: TableResolver + 'static,
{
    pub fn new(
        client: Arc<C>,
        dispatcher: Arc<D>,
        resolver: Arc<R>,
        tables: Vec<TableTarget>,
        settings: ConsumerSettings,
    ) -> Self {
        let state = Arc::new(ConsumerState::new(settings.retry_limit));
        let discovery = Arc::new(StreamDiscovery::new(
            client, dispatcher, resolver, state, settings,
        ));
        Self { discovery, tables }
    }

    /// Shared state bundle, exposed for the host and for tests
    pub fn state(&self) -> &Arc<ConsumerState> {
        self.discovery.state()
    }

    /// Run discovery for every configured table
    ///
    /// Returns once discovery has settled for all tables (succeeded, failed
    /// terminally, or exhausted its retries). Spawned shard pollers are
    /// detached and continue until process exit.
    pub async fn run(&self) {
        if self.tables.is_empty() {
            error!("no tables configured; stream consumer has nothing to do");
            return;
        }

        info!(tables = self.tables.len(), "starting stream consumer");

        let mut handles = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            let discovery = Arc::clone(&self.discovery);
            let target = table.clone();
            handles.push(tokio::spawn(async move {
                discovery.run_for_table(&target).await;
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "discovery task panicked");
            }
        }
    }
}

//! Per-shard polling loop
//!
//! One poller owns one shard's position token for the life of the process.
//! The loop is an explicit `loop` rather than self-invocation so a
//! long-running poller never grows the call stack, and it is designed to
//! never die: read failures and missing continuations are logged and polling
//! carries on.

use crate::ConsumerSettings;
use crate::dispatch::Dispatcher;
use crate::state::ConsumerState;
use std::sync::Arc;
use tabletail_client::{IteratorToken, RecordBatch, ShardId, StreamApi};
use tracing::{debug, info, warn};

/// Number of consecutive continuations before the stream counts as confirmed
///
/// Freshly enabled streams tend to hand out one good iterator before they are
/// really serving, so one success alone proves nothing.
const CONFIRMED_AFTER_SUCCESSES: u32 = 2;

/// Polling loop for a single shard
pub struct ShardPoller<C, D> {
    table: String,
    shard: ShardId,
    client: Arc<C>,
    dispatcher: Arc<D>,
    state: Arc<ConsumerState>,
    settings: ConsumerSettings,
}

impl<C, D> ShardPoller<C, D>
where
    C: StreamApi + 'static,
    D: Dispatcher + 'static,
{
    pub fn new(
        table: String,
        shard: ShardId,
        client: Arc<C>,
        dispatcher: Arc<D>,
        state: Arc<ConsumerState>,
        settings: ConsumerSettings,
    ) -> Self {
        Self {
            table,
            shard,
            client,
            dispatcher,
            state,
            settings,
        }
    }

    /// Run the polling loop, seeded with the iterator from discovery
    ///
    /// Never returns; cancellation model is process exit.
    pub async fn run(self, seed: IteratorToken) {
        let mut token = seed;

        loop {
            // A failed read is an empty read, never fatal
            let batch = match self.client.get_records(&token).await {
                Ok(batch) => batch,
                Err(e) => {
                    warn!(
                        table = %self.table,
                        shard = %self.shard,
                        error = %e,
                        "failed to read records"
                    );
                    RecordBatch::empty()
                }
            };

            let RecordBatch {
                records,
                next_token,
            } = batch;

            if !records.is_empty() {
                debug!(
                    table = %self.table,
                    shard = %self.shard,
                    records = records.len(),
                    "delivering batch"
                );
                self.dispatcher.deliver(&self.table, records).await;
            }

            tokio::time::sleep(self.settings.poll_interval).await;

            match next_token {
                Some(next) => {
                    token = next;
                    if self.state.successes.increment() == CONFIRMED_AFTER_SUCCESSES {
                        info!(
                            table = %self.table,
                            "stream confirmed; polling for records"
                        );
                        self.state.budget.reset();
                    }
                }
                None => {
                    let remaining = self.state.budget.remaining();
                    warn!(
                        table = %self.table,
                        shard = %self.shard,
                        remaining,
                        "missing next iterator; will retry"
                    );
                    self.state.budget.consume();
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
            }
        }
    }
}

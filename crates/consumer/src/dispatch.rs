//! Batch hand-off to the downstream handler
//!
//! Delivery is fire-and-forget from the poller's perspective: no ack is
//! consumed and no redelivery happens here. Duplicate or dropped delivery on
//! handler failure is the handler's concern.

use tabletail_client::ChangeRecord;
use tokio::sync::mpsc;
use tracing::error;

/// A batch delivered to the downstream handler
#[derive(Debug, Clone)]
pub struct DeliveredBatch {
    /// Logical name of the table the records came from
    pub table: String,
    /// The change records, in shard order
    pub records: Vec<ChangeRecord>,
}

/// Sink for non-empty record batches
pub trait Dispatcher: Send + Sync {
    /// Hand a batch of records to the downstream handler
    fn deliver(
        &self,
        table: &str,
        records: Vec<ChangeRecord>,
    ) -> impl std::future::Future<Output = ()> + Send;
}

/// Dispatcher that forwards batches over a tokio channel
///
/// The host wires the receiving end to whatever should consume the events.
/// A send failure (receiver dropped) is logged and the batch is discarded.
pub struct ChannelDispatcher {
    sender: mpsc::Sender<DeliveredBatch>,
}

impl ChannelDispatcher {
    pub fn new(sender: mpsc::Sender<DeliveredBatch>) -> Self {
        Self { sender }
    }
}

impl Dispatcher for ChannelDispatcher {
    async fn deliver(&self, table: &str, records: Vec<ChangeRecord>) {
        let batch = DeliveredBatch {
            table: table.to_string(),
            records,
        };
        if let Err(e) = self.sender.send(batch).await {
            error!(table, error = %e, "failed to hand batch to downstream channel");
        }
    }
}

/// Dispatcher that prints each record as one JSON line on stdout
#[derive(Debug, Default)]
pub struct StdoutDispatcher;

impl StdoutDispatcher {
    pub fn new() -> Self {
        Self
    }
}

impl Dispatcher for StdoutDispatcher {
    async fn deliver(&self, table: &str, records: Vec<ChangeRecord>) {
        for record in records {
            let line = serde_json::json!({
                "table": table,
                "eventID": record.event_id,
                "eventName": record.event_name,
                "dynamodb": record.change,
            });
            println!("{}", line);
        }
    }
}

//! Consumer scenario tests
//!
//! Driven against the scripted mock client with a paused tokio clock, so the
//! 10s polling interval and 3s retry delay elapse instantly and
//! deterministically.

use crate::consumer::{ConsumerSettings, StreamConsumer};
use crate::discovery::{StreamDiscovery, TableTarget};
use crate::dispatch::{ChannelDispatcher, DeliveredBatch};
use crate::poller::ShardPoller;
use crate::state::ConsumerState;
use std::sync::Arc;
use std::time::Duration;
use tabletail_client::{
    ChangeRecord, ClientError, IteratorToken, MockClient, PrefixResolver, RecordBatch, ShardId,
    StreamId, TableDescription,
};
use tokio::sync::mpsc;

// ============================================================================
// Helpers
// ============================================================================

fn with_stream(id: &str) -> TableDescription {
    TableDescription {
        stream_id: Some(StreamId::new(id)),
    }
}

fn without_stream() -> TableDescription {
    TableDescription { stream_id: None }
}

fn record(id: &str) -> ChangeRecord {
    ChangeRecord {
        event_id: id.to_string(),
        event_name: "INSERT".to_string(),
        change: serde_json::Value::Null,
    }
}

fn batch(count: usize, next: Option<&str>) -> RecordBatch {
    RecordBatch {
        records: (0..count).map(|i| record(&format!("e{}", i))).collect(),
        next_token: next.map(IteratorToken::new),
    }
}

type TestDiscovery = StreamDiscovery<MockClient, ChannelDispatcher, PrefixResolver>;

/// Discovery over a mock client with default settings (10s poll, 3s retry,
/// budget 3)
fn discovery(client: Arc<MockClient>) -> (TestDiscovery, mpsc::Receiver<DeliveredBatch>) {
    let (tx, rx) = mpsc::channel(16);
    let settings = ConsumerSettings::default();
    let state = Arc::new(ConsumerState::new(settings.retry_limit));
    let discovery = StreamDiscovery::new(
        client,
        Arc::new(ChannelDispatcher::new(tx)),
        Arc::new(PrefixResolver::default()),
        state,
        settings,
    );
    (discovery, rx)
}

fn spawn_poller(
    client: Arc<MockClient>,
    state: Arc<ConsumerState>,
    seed: &str,
) -> mpsc::Receiver<DeliveredBatch> {
    let (tx, rx) = mpsc::channel(16);
    let poller = ShardPoller::new(
        "orders".to_string(),
        ShardId::new("shard-1"),
        client,
        Arc::new(ChannelDispatcher::new(tx)),
        state,
        ConsumerSettings::default(),
    );
    tokio::spawn(poller.run(IteratorToken::new(seed)));
    rx
}

// ============================================================================
// Discovery tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_no_duplicate_poller_across_repeated_discovery() {
    let client = Arc::new(MockClient::new());
    // Two discovery runs, both listing the same shard with a fresh iterator
    client.push_describe_table(Ok(with_stream("stream-1")));
    client.push_describe_table(Ok(with_stream("stream-1")));
    client.push_describe_stream(Ok(vec![ShardId::new("shard-1")]));
    client.push_describe_stream(Ok(vec![ShardId::new("shard-1")]));
    client.push_iterator(Ok(Some(IteratorToken::new("t1"))));
    client.push_iterator(Ok(Some(IteratorToken::new("t2"))));

    let (discovery, _rx) = discovery(Arc::clone(&client));
    let target = TableTarget::new("orders");
    discovery.run_for_table(&target).await;
    discovery.run_for_table(&target).await;

    assert_eq!(discovery.state().seen_shard_count(), 1);

    // A single poller reads once at t=0 and not again before t=13s
    // (10s interval + 3s retry delay); a duplicate would double the count.
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(client.calls().get_records, 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_shards_retries_then_abandons() {
    let client = Arc::new(MockClient::new());
    for _ in 0..4 {
        client.push_describe_table(Ok(with_stream("stream-1")));
        client.push_describe_stream(Ok(vec![]));
    }

    let (discovery, _rx) = discovery(Arc::clone(&client));
    discovery.run_for_table(&TableTarget::new("orders")).await;

    // Initial attempt plus the default 3 retries, then abandonment
    assert_eq!(client.calls().describe_stream, 4);
    assert_eq!(discovery.state().budget.remaining(), 0);
    assert_eq!(discovery.state().seen_shard_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_enable_stream_once_then_redescribe() {
    let client = Arc::new(MockClient::new());
    client.push_describe_table(Ok(without_stream()));
    client.push_describe_table(Ok(with_stream("stream-1")));
    client.push_describe_stream(Ok(vec![ShardId::new("shard-1")]));
    client.push_iterator(Ok(Some(IteratorToken::new("t1"))));

    let (discovery, _rx) = discovery(Arc::clone(&client));
    discovery.run_for_table(&TableTarget::new("orders")).await;

    let calls = client.calls();
    assert_eq!(calls.enable_stream, 1);
    assert_eq!(calls.describe_table, 2);
    assert_eq!(discovery.state().seen_shard_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_table_not_found_is_terminal() {
    let client = Arc::new(MockClient::new());
    client.push_describe_table(Err(ClientError::api(
        "ResourceNotFoundException",
        "Requested resource not found",
    )));

    let (discovery, _rx) = discovery(Arc::clone(&client));
    discovery.run_for_table(&TableTarget::new("orders")).await;

    // No retry scheduled and the budget is untouched
    assert_eq!(client.calls().describe_table, 1);
    assert_eq!(discovery.state().budget.remaining(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_unclassified_error_logged_without_retry() {
    let client = Arc::new(MockClient::new());
    client.push_describe_table(Err(ClientError::api("InternalFailure", "boom")));

    let (discovery, _rx) = discovery(Arc::clone(&client));
    discovery.run_for_table(&TableTarget::new("orders")).await;

    assert_eq!(client.calls().describe_table, 1);
    assert_eq!(discovery.state().budget.remaining(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_missing_iterator_error_is_retried() {
    let client = Arc::new(MockClient::new());
    for _ in 0..4 {
        client.push_describe_table(Ok(with_stream("stream-1")));
        client.push_describe_stream(Ok(vec![ShardId::new("shard-1")]));
        client.push_iterator(Err(ClientError::api(
            "MissingRequiredParameter",
            "Missing required key 'ShardIterator' in params",
        )));
    }

    let (discovery, _rx) = discovery(Arc::clone(&client));
    discovery.run_for_table(&TableTarget::new("orders")).await;

    assert_eq!(client.calls().get_iterator, 4);
    assert_eq!(discovery.state().budget.remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_partial_shard_success_is_enough() {
    let client = Arc::new(MockClient::new());
    client.push_describe_table(Ok(with_stream("stream-1")));
    client.push_describe_stream(Ok(vec![ShardId::new("shard-1"), ShardId::new("shard-2")]));
    client.push_iterator(Ok(None));
    client.push_iterator(Ok(Some(IteratorToken::new("t1"))));

    let (discovery, _rx) = discovery(Arc::clone(&client));
    discovery.run_for_table(&TableTarget::new("orders")).await;

    // One shard yielded an iterator, so the attempt succeeds without retry
    assert_eq!(discovery.state().seen_shard_count(), 1);
    assert_eq!(discovery.state().budget.remaining(), 3);
}

// ============================================================================
// Poller tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_two_consecutive_successes_reset_budget() {
    let client = Arc::new(MockClient::new());
    client.push_records(Ok(batch(1, Some("t2"))));
    client.push_records(Ok(batch(0, Some("t3"))));

    let state = Arc::new(ConsumerState::new(3));
    // Budget exhausted by unrelated failures
    state.budget.consume();
    state.budget.consume();
    state.budget.consume();
    assert_eq!(state.budget.remaining(), 0);

    let mut rx = spawn_poller(Arc::clone(&client), Arc::clone(&state), "t1");

    // Second continuation lands after two 10s cycles
    tokio::time::sleep(Duration::from_millis(21_000)).await;
    assert_eq!(state.budget.remaining(), 3);
    assert_eq!(state.successes.count(), 2);

    let delivered = rx.try_recv().unwrap();
    assert_eq!(delivered.records.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_read_does_not_stop_poller() {
    let client = Arc::new(MockClient::new());
    client.push_records(Err(ClientError::api("InternalFailure", "connection reset")));

    let state = Arc::new(ConsumerState::new(3));
    let mut rx = spawn_poller(Arc::clone(&client), Arc::clone(&state), "t1");

    // Failed read at t=0 becomes an empty read: 10s interval plus the 3s
    // retry delay, then the loop reads again.
    tokio::time::sleep(Duration::from_millis(14_000)).await;
    assert_eq!(client.calls().get_records, 2);
    assert_eq!(state.budget.remaining(), 2);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_orders_scenario_delivers_once_and_keeps_polling() {
    let client = Arc::new(MockClient::new());
    client.push_describe_table(Ok(with_stream("stream-orders")));
    client.push_describe_stream(Ok(vec![ShardId::new("shard-1")]));
    client.push_iterator(Ok(Some(IteratorToken::new("t1"))));
    client.push_records(Ok(batch(2, Some("t2"))));
    client.push_records(Ok(batch(0, None)));

    let (discovery, mut rx) = discovery(Arc::clone(&client));
    discovery.run_for_table(&TableTarget::new("Orders")).await;

    // Cycle 1 delivers the two records; cycle 2 has no records and no next
    // token, so the retry countdown fires and polling continues.
    tokio::time::sleep(Duration::from_millis(25_000)).await;

    let delivered = rx.try_recv().unwrap();
    assert_eq!(delivered.table, "Orders");
    assert_eq!(delivered.records.len(), 2);
    assert!(rx.try_recv().is_err(), "only one batch should be delivered");

    assert!(client.calls().get_records >= 3, "poller must keep polling");
    assert_eq!(discovery.state().budget.remaining(), 2);
}

// ============================================================================
// Consumer entry-point tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_no_tables_configured_does_nothing() {
    let client = Arc::new(MockClient::new());
    let (tx, _rx) = mpsc::channel(16);
    let consumer = StreamConsumer::new(
        Arc::clone(&client),
        Arc::new(ChannelDispatcher::new(tx)),
        Arc::new(PrefixResolver::default()),
        vec![],
        ConsumerSettings::default(),
    );

    consumer.run().await;
    assert_eq!(client.calls().describe_table, 0);
}

#[tokio::test(start_paused = true)]
async fn test_consumer_runs_discovery_per_table() {
    let client = Arc::new(MockClient::new());
    // Scripted responses are popped in call order; both tables find a stream
    // with one shard each.
    client.push_describe_table(Ok(with_stream("stream-1")));
    client.push_describe_table(Ok(with_stream("stream-2")));
    client.push_describe_stream(Ok(vec![ShardId::new("shard-a")]));
    client.push_describe_stream(Ok(vec![ShardId::new("shard-b")]));
    client.push_iterator(Ok(Some(IteratorToken::new("ta"))));
    client.push_iterator(Ok(Some(IteratorToken::new("tb"))));

    let (tx, _rx) = mpsc::channel(16);
    let consumer = StreamConsumer::new(
        Arc::clone(&client),
        Arc::new(ChannelDispatcher::new(tx)),
        Arc::new(PrefixResolver::default()),
        vec![TableTarget::new("orders"), TableTarget::new("sessions")],
        ConsumerSettings::default(),
    );

    consumer.run().await;
    assert_eq!(consumer.state().seen_shard_count(), 2);
    assert_eq!(client.calls().describe_table, 2);
}

//! Wire-level types shared by the client and the consumer
//!
//! Tokens and identifiers are opaque newtypes - the consumer never inspects
//! their contents, it only threads them between calls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a table's change stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(String);

impl StreamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of one shard within a change stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardId(String);

impl ShardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque position token for reading a shard
///
/// Source-supplied; each successful read yields the token for the next read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IteratorToken(String);

impl IteratorToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of describing a table
#[derive(Debug, Clone)]
pub struct TableDescription {
    /// Identifier of the table's change stream, if one is enabled
    pub stream_id: Option<StreamId>,
}

impl TableDescription {
    /// Whether the table has a change stream configured
    pub fn stream_enabled(&self) -> bool {
        self.stream_id.is_some()
    }
}

/// One table-mutation event read from a shard
///
/// The record body (keys, old/new images) is passed through as raw JSON;
/// interpreting it is the downstream handler's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Unique event identifier
    #[serde(rename = "eventID")]
    pub event_id: String,

    /// Mutation kind: INSERT, MODIFY or REMOVE
    #[serde(rename = "eventName")]
    pub event_name: String,

    /// Raw change body (keys plus new and old images)
    #[serde(rename = "dynamodb", default)]
    pub change: serde_json::Value,
}

/// A batch of records read from a shard
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    /// Records in this read; may be empty
    pub records: Vec<ChangeRecord>,

    /// Token for the next read, absent when the source had none to give
    pub next_token: Option<IteratorToken>,
}

impl RecordBatch {
    /// Batch with no records and no continuation
    ///
    /// Used when a read fails and the poller carries on with its old token.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_id_display() {
        let shard = ShardId::new("shardId-000000000001");
        assert_eq!(shard.to_string(), "shardId-000000000001");
        assert_eq!(shard.as_str(), "shardId-000000000001");
    }

    #[test]
    fn test_table_description_stream_enabled() {
        let desc = TableDescription { stream_id: None };
        assert!(!desc.stream_enabled());

        let desc = TableDescription {
            stream_id: Some(StreamId::new("stream-1")),
        };
        assert!(desc.stream_enabled());
    }

    #[test]
    fn test_change_record_wire_names() {
        let json = r#"{
            "eventID": "e1",
            "eventName": "INSERT",
            "dynamodb": {"Keys": {"id": {"S": "1"}}}
        }"#;
        let record: ChangeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.event_id, "e1");
        assert_eq!(record.event_name, "INSERT");
        assert!(record.change.get("Keys").is_some());
    }

    #[test]
    fn test_change_record_missing_body() {
        let record: ChangeRecord =
            serde_json::from_str(r#"{"eventID": "e2", "eventName": "REMOVE"}"#).unwrap();
        assert!(record.change.is_null());
    }

    #[test]
    fn test_empty_batch() {
        let batch = RecordBatch::empty();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
        assert!(batch.next_token.is_none());
    }
}

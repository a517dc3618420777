//! Scripted in-memory transport for tests
//!
//! Each API method pops the next scripted response from its queue and counts
//! the call. Exhausted queues fall back to a neutral default so long-running
//! poll loops in tests stay quiet: reads return an empty batch with no
//! continuation, everything else reports the resource as missing.

use crate::error::ClientError;
use crate::traits::{StreamApi, TableApi};
use crate::types::{IteratorToken, RecordBatch, ShardId, StreamId, TableDescription};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Call counters, readable from tests
#[derive(Debug, Default, Clone, Copy)]
pub struct MockCalls {
    pub describe_table: u32,
    pub enable_stream: u32,
    pub describe_stream: u32,
    pub get_iterator: u32,
    pub get_records: u32,
}

#[derive(Default)]
struct Script {
    describe_table: VecDeque<Result<TableDescription, ClientError>>,
    enable_stream: VecDeque<Result<(), ClientError>>,
    describe_stream: VecDeque<Result<Vec<ShardId>, ClientError>>,
    iterators: VecDeque<Result<Option<IteratorToken>, ClientError>>,
    records: VecDeque<Result<RecordBatch, ClientError>>,
    calls: MockCalls,
}

/// In-memory implementation of [`TableApi`] and [`StreamApi`]
#[derive(Default)]
pub struct MockClient {
    script: Mutex<Script>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a describe-table response
    pub fn push_describe_table(&self, response: Result<TableDescription, ClientError>) {
        self.lock().describe_table.push_back(response);
    }

    /// Queue an enable-stream response
    pub fn push_enable_stream(&self, response: Result<(), ClientError>) {
        self.lock().enable_stream.push_back(response);
    }

    /// Queue a describe-stream response
    pub fn push_describe_stream(&self, response: Result<Vec<ShardId>, ClientError>) {
        self.lock().describe_stream.push_back(response);
    }

    /// Queue a get-iterator response
    pub fn push_iterator(&self, response: Result<Option<IteratorToken>, ClientError>) {
        self.lock().iterators.push_back(response);
    }

    /// Queue a get-records response
    pub fn push_records(&self, response: Result<RecordBatch, ClientError>) {
        self.lock().records.push_back(response);
    }

    /// Snapshot of the call counters
    pub fn calls(&self) -> MockCalls {
        self.lock().calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().expect("mock script lock poisoned")
    }

    fn unscripted() -> ClientError {
        ClientError::api("ResourceNotFoundException", "no scripted response")
    }
}

impl TableApi for MockClient {
    async fn describe_table(&self, _table: &str) -> Result<TableDescription, ClientError> {
        let mut script = self.lock();
        script.calls.describe_table += 1;
        script
            .describe_table
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn enable_stream(&self, _table: &str) -> Result<(), ClientError> {
        let mut script = self.lock();
        script.calls.enable_stream += 1;
        script.enable_stream.pop_front().unwrap_or(Ok(()))
    }
}

impl StreamApi for MockClient {
    async fn describe_stream(&self, _stream: &StreamId) -> Result<Vec<ShardId>, ClientError> {
        let mut script = self.lock();
        script.calls.describe_stream += 1;
        script
            .describe_stream
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted()))
    }

    async fn get_iterator(
        &self,
        _stream: &StreamId,
        _shard: &ShardId,
    ) -> Result<Option<IteratorToken>, ClientError> {
        let mut script = self.lock();
        script.calls.get_iterator += 1;
        script.iterators.pop_front().unwrap_or(Ok(None))
    }

    async fn get_records(&self, _token: &IteratorToken) -> Result<RecordBatch, ClientError> {
        let mut script = self.lock();
        script.calls.get_records += 1;
        script
            .records
            .pop_front()
            .unwrap_or_else(|| Ok(RecordBatch::empty()))
    }
}

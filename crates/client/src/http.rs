//! HTTP transport for local storage endpoints
//!
//! Local storage emulators expose both the table-management and stream-read
//! APIs on one port, dispatching on the `x-amz-target` header with JSON
//! request/response bodies. Authentication is a placeholder - local endpoints
//! only parse the credential string to namespace tables by region/key.

use crate::error::ClientError;
use crate::traits::{StreamApi, TableApi};
use crate::types::{ChangeRecord, IteratorToken, RecordBatch, ShardId, StreamId, TableDescription};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Request timeout for a single API call
const REQUEST_TIMEOUT_SECS: u64 = 30;

const TARGET_DESCRIBE_TABLE: &str = "DynamoDB_20120810.DescribeTable";
const TARGET_UPDATE_TABLE: &str = "DynamoDB_20120810.UpdateTable";
const TARGET_DESCRIBE_STREAM: &str = "DynamoDBStreams_20120810.DescribeStream";
const TARGET_GET_ITERATOR: &str = "DynamoDBStreams_20120810.GetShardIterator";
const TARGET_GET_RECORDS: &str = "DynamoDBStreams_20120810.GetRecords";

/// HTTP client for the storage and stream APIs
pub struct HttpClient {
    http: reqwest::Client,
    endpoint: String,
    authorization: String,
}

impl HttpClient {
    /// Create a client for the given endpoint URL and region
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails (e.g. TLS or proxy
    /// misconfiguration)
    pub fn new(endpoint: impl Into<String>, region: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent("tabletail/0.1")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::Init(format!("HTTP client: {}", e)))?;

        // Placeholder credential in the shape local endpoints expect
        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential=local/00000000/{}/dynamodb/aws4_request, \
             SignedHeaders=host;x-amz-target, Signature=local",
            region
        );

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            authorization,
        })
    }

    /// Issue one API call and decode the JSON response
    async fn call<T: DeserializeOwned>(
        &self,
        target: &str,
        body: serde_json::Value,
    ) -> Result<T, ClientError> {
        debug!(target, "calling endpoint");

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-amz-target", target)
            .header("content-type", "application/x-amz-json-1.0")
            .header("authorization", &self.authorization)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let error: ApiErrorBody = response.json().await.unwrap_or(ApiErrorBody {
                error_type: None,
                message: None,
            });
            Err(ClientError::api(
                error.code().unwrap_or_else(|| status.to_string()),
                error.message.unwrap_or_default(),
            ))
        }
    }
}

impl TableApi for HttpClient {
    async fn describe_table(&self, table: &str) -> Result<TableDescription, ClientError> {
        let response: DescribeTableResponse = self
            .call(TARGET_DESCRIBE_TABLE, json!({ "TableName": table }))
            .await?;

        Ok(TableDescription {
            stream_id: response.table.latest_stream_arn.map(StreamId::new),
        })
    }

    async fn enable_stream(&self, table: &str) -> Result<(), ClientError> {
        let _: serde_json::Value = self
            .call(
                TARGET_UPDATE_TABLE,
                json!({
                    "TableName": table,
                    "StreamSpecification": {
                        "StreamEnabled": true,
                        "StreamViewType": "NEW_AND_OLD_IMAGES"
                    }
                }),
            )
            .await?;
        Ok(())
    }
}

impl StreamApi for HttpClient {
    async fn describe_stream(&self, stream: &StreamId) -> Result<Vec<ShardId>, ClientError> {
        let response: DescribeStreamResponse = self
            .call(
                TARGET_DESCRIBE_STREAM,
                json!({ "StreamArn": stream.as_str() }),
            )
            .await?;

        Ok(response
            .description
            .shards
            .into_iter()
            .map(|s| ShardId::new(s.shard_id))
            .collect())
    }

    async fn get_iterator(
        &self,
        stream: &StreamId,
        shard: &ShardId,
    ) -> Result<Option<IteratorToken>, ClientError> {
        let response: GetIteratorResponse = self
            .call(
                TARGET_GET_ITERATOR,
                json!({
                    "StreamArn": stream.as_str(),
                    "ShardId": shard.as_str(),
                    "ShardIteratorType": "LATEST"
                }),
            )
            .await?;

        Ok(response.shard_iterator.map(IteratorToken::new))
    }

    async fn get_records(&self, token: &IteratorToken) -> Result<RecordBatch, ClientError> {
        let response: GetRecordsResponse = self
            .call(
                TARGET_GET_RECORDS,
                json!({ "ShardIterator": token.as_str() }),
            )
            .await?;

        Ok(RecordBatch {
            records: response.records,
            next_token: response.next_shard_iterator.map(IteratorToken::new),
        })
    }
}

// --- API Response Types ---

#[derive(Debug, Deserialize)]
struct DescribeTableResponse {
    #[serde(rename = "Table")]
    table: TableMeta,
}

#[derive(Debug, Deserialize)]
struct TableMeta {
    #[serde(rename = "LatestStreamArn")]
    latest_stream_arn: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DescribeStreamResponse {
    #[serde(rename = "StreamDescription")]
    description: StreamDescription,
}

#[derive(Debug, Deserialize)]
struct StreamDescription {
    #[serde(rename = "Shards", default)]
    shards: Vec<ShardMeta>,
}

#[derive(Debug, Deserialize)]
struct ShardMeta {
    #[serde(rename = "ShardId")]
    shard_id: String,
}

#[derive(Debug, Deserialize)]
struct GetIteratorResponse {
    #[serde(rename = "ShardIterator")]
    shard_iterator: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetRecordsResponse {
    #[serde(rename = "Records", default)]
    records: Vec<ChangeRecord>,
    #[serde(rename = "NextShardIterator")]
    next_shard_iterator: Option<String>,
}

/// Error body returned by the endpoint
///
/// The `__type` field carries a namespaced code like
/// `com.amazonaws.dynamodb.v20120810#ResourceNotFoundException`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl ApiErrorBody {
    /// Short code after the namespace separator
    fn code(&self) -> Option<String> {
        self.error_type
            .as_ref()
            .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
    }
}

//! Error types for the client

use thiserror::Error;

/// Errors that can occur when calling the storage or stream APIs
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to construct the HTTP client
    #[error("failed to initialize client: {0}")]
    Init(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The endpoint returned a structured API error
    #[error("API error {code}: {message}")]
    Api {
        /// Short error code (e.g. "ResourceNotFoundException")
        code: String,
        /// Human-readable message from the endpoint
        message: String,
    },
}

impl ClientError {
    /// Create an Api error
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The named table (or stream) does not exist at the endpoint
    pub fn is_resource_not_found(&self) -> bool {
        matches!(self, Self::Api { code, .. } if code == "ResourceNotFoundException")
    }

    /// A required iterator parameter was missing from a stream call
    ///
    /// Raised by local endpoints while a freshly enabled stream is still
    /// seeding; same remediation as shards-awaiting-init.
    pub fn is_missing_iterator(&self) -> bool {
        match self {
            Self::Api { code, message } => {
                code == "MissingRequiredParameter" && message.contains("ShardIterator")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_not_found_classification() {
        let err = ClientError::api("ResourceNotFoundException", "no such table");
        assert!(err.is_resource_not_found());
        assert!(!err.is_missing_iterator());
    }

    #[test]
    fn test_missing_iterator_classification() {
        let err = ClientError::api(
            "MissingRequiredParameter",
            "Missing required key 'ShardIterator' in params",
        );
        assert!(err.is_missing_iterator());
        assert!(!err.is_resource_not_found());
    }

    #[test]
    fn test_missing_other_parameter_not_classified() {
        let err = ClientError::api("MissingRequiredParameter", "Missing required key 'StreamArn'");
        assert!(!err.is_missing_iterator());
    }

    #[test]
    fn test_api_error_display() {
        let err = ClientError::api("ValidationException", "bad request");
        assert!(err.to_string().contains("ValidationException"));
        assert!(err.to_string().contains("bad request"));
    }
}

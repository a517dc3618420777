//! Storage endpoint settings
//!
//! Both the table-management and stream-read APIs live behind a single local
//! endpoint, so one URL covers both.

use serde::Deserialize;

/// Endpoint configuration for the storage and stream APIs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of the local storage endpoint
    /// Default: http://localhost:8000
    pub url: String,

    /// Region name sent with requests (local endpoints only namespace by it)
    /// Default: "local"
    pub region: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            region: "local".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EndpointConfig::default();
        assert_eq!(config.url, "http://localhost:8000");
        assert_eq!(config.region, "local");
    }

    #[test]
    fn test_deserialize_override() {
        let config: EndpointConfig =
            toml::from_str("url = \"http://127.0.0.1:4566\"\nregion = \"test\"").unwrap();
        assert_eq!(config.url, "http://127.0.0.1:4566");
        assert_eq!(config.region, "test");
    }
}

//! Backend client configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CloudError, CloudResult};

/// Configuration for the InitFlow API client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Base URL for the InitFlow API (e.g., "https://api.initflow.com").
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.initflow.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl CloudConfig {
    /// Checks the values the HTTP client depends on.
    pub fn validate(&self) -> CloudResult<()> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(CloudError::Config("api_base_url is empty".to_string()));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(CloudError::Config(format!(
                "api_base_url must be http(s): {url}"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(CloudError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim().trim_end_matches('/')
    }

    /// Creates a config pointing at a local API for testing.
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            api_base_url: "http://localhost:4000".to_string(),
            request_timeout_secs: 5,
        }
    }
}

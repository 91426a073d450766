//! External analysis service configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default request timeout. Stage calls are long-running generations.
const fn default_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzerConfig {
    /// Base URL of the analysis service (e.g., `https://analyzer.internal`).
    #[serde(default)]
    pub endpoint: String,

    /// Bearer token sent with every request. Empty means no auth header.
    #[serde(default)]
    pub api_key: String,

    /// Model name forwarded to the service. Empty lets the service choose.
    #[serde(default)]
    pub model: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AnalyzerConfig {
    /// Check if an endpoint has been set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty()
    }

    /// Fail with `NotConfigured` / `InvalidValue` unless the section is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the endpoint is missing, is not an HTTP(S)
    /// URL, or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "analyzer".to_string(),
            });
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "analyzer.endpoint".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.endpoint),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analyzer.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

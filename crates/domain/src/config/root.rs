use crate::config::{LoggingConfig, UpstreamPoolConfig};
use crate::errors::RedirError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedirConfig {
    /// Wall-clock budget for one redirected request, retries included.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub pools: Vec<UpstreamPoolConfig>,
}

impl RedirConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, RedirError> {
        toml::from_str(raw).map_err(|e| RedirError::ConfigError(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for RedirConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            logging: LoggingConfig::default(),
            pools: Vec::new(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

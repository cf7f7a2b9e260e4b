use crate::config::HealthCheckConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamPoolConfig {
    pub name: String,

    /// Domain suffixes this pool answers for, in configuration order.
    pub zones: Vec<String>,

    /// Upstream endpoints, e.g. `"udp://8.8.8.8:53"` or `"tls://9.9.9.9"`.
    pub servers: Vec<String>,

    /// Failure count at which a host stops being selected. Zero disables
    /// failure accounting for this pool.
    #[serde(default = "default_max_fails")]
    pub max_fails: u32,

    #[serde(default)]
    pub force_tcp: bool,

    #[serde(default)]
    pub prefer_udp: bool,

    #[serde(default)]
    pub health: HealthCheckConfig,
}

fn default_max_fails() -> u32 {
    3
}

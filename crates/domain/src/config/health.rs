use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthCheckConfig {
    /// Seconds between periodic liveness sweeps. Zero disables health
    /// checking for the pool.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,

    /// How long a recorded failure stays on a host's counter before the
    /// detached decay task takes it back off.
    #[serde(default = "default_fail_timeout_ms")]
    pub fail_timeout_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            check_interval: default_check_interval(),
            fail_timeout_ms: default_fail_timeout_ms(),
        }
    }
}

fn default_check_interval() -> u64 {
    30
}

fn default_fail_timeout_ms() -> u64 {
    2_000
}

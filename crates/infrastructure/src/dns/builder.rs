use super::matcher::ZoneMatcher;
use super::upstream::{HealthPolicy, RedirUpstream, Upstream, UpstreamHost};
use dns_redir_application::{Exchanger, HealthProbe};
use dns_redir_domain::{RedirConfig, RedirError, TransportFlags, UpstreamEndpoint};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Builds the ordered pool list from configuration. The transport and the
/// prober are injected; this layer only wires them to hosts.
pub fn build_upstreams(
    config: &RedirConfig,
    exchanger: Arc<dyn Exchanger>,
    probe: Arc<dyn HealthProbe>,
) -> Result<Vec<Arc<dyn Upstream>>, RedirError> {
    if config.pools.is_empty() {
        return Err(RedirError::ConfigError(
            "at least one pool must be configured".into(),
        ));
    }

    let mut upstreams: Vec<Arc<dyn Upstream>> = Vec::with_capacity(config.pools.len());
    for pool in &config.pools {
        if pool.zones.is_empty() {
            return Err(RedirError::ConfigError(format!(
                "pool '{}' has no zones",
                pool.name
            )));
        }
        if pool.servers.is_empty() {
            return Err(RedirError::ConfigError(format!(
                "pool '{}' has no servers",
                pool.name
            )));
        }
        if pool.force_tcp && pool.prefer_udp {
            return Err(RedirError::ConfigError(format!(
                "pool '{}': force_tcp and prefer_udp are mutually exclusive",
                pool.name
            )));
        }

        let flags = TransportFlags {
            force_tcp: pool.force_tcp,
            prefer_udp: pool.prefer_udp,
        };
        let hosts = pool
            .servers
            .iter()
            .map(|server| {
                let endpoint: UpstreamEndpoint = server.parse()?;
                Ok(Arc::new(UpstreamHost::new(
                    endpoint,
                    flags,
                    Arc::clone(&exchanger),
                    Arc::clone(&probe),
                )))
            })
            .collect::<Result<Vec<_>, RedirError>>()?;

        let policy = HealthPolicy {
            max_fails: pool.max_fails,
            check_interval: Duration::from_secs(pool.health.check_interval),
            fail_timeout: Duration::from_millis(pool.health.fail_timeout_ms),
        };

        debug!(pool = %pool.name, zones = pool.zones.len(), hosts = hosts.len(), "pool built");
        upstreams.push(Arc::new(RedirUpstream::new(
            pool.name.clone(),
            ZoneMatcher::new(&pool.zones),
            hosts,
            policy,
        )));
    }

    Ok(upstreams)
}

use super::UpstreamHost;
use crate::dns::matcher::ZoneMatcher;
use dns_redir_domain::RedirError;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Health accounting knobs of one pool, promoted into the `Upstream`
/// contract so the redirector never needs to recover them through a
/// downcast.
#[derive(Debug, Clone, Copy)]
pub struct HealthPolicy {
    /// Failure count at which a host stops being selected; zero disables
    /// failure accounting.
    pub max_fails: u32,
    /// Period of the liveness sweep; zero disables health checking.
    pub check_interval: Duration,
    /// How long a recorded failure stays on the counter before decay.
    pub fail_timeout: Duration,
}

/// A managed pool of upstream hosts for a set of zones.
pub trait Upstream: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Whether a normalized query name should be routed to this pool.
    fn match_name(&self, name: &str) -> bool;

    /// A healthy host to route to, `None` if the pool has none.
    fn select(&self) -> Option<Arc<UpstreamHost>>;

    fn start(&self) -> Result<(), RedirError>;
    fn stop(&self) -> Result<(), RedirError>;

    fn health_policy(&self) -> HealthPolicy;

    /// True while the pool's initial name/host list is still populating.
    fn populating(&self) -> bool;
}

#[derive(Debug)]
pub struct RedirUpstream {
    name: String,
    matcher: ZoneMatcher,
    hosts: Vec<Arc<UpstreamHost>>,
    policy: HealthPolicy,
    initial_count: AtomicI32,
    sweep: Mutex<Option<CancellationToken>>,
}

impl RedirUpstream {
    pub fn new(
        name: impl Into<String>,
        matcher: ZoneMatcher,
        hosts: Vec<Arc<UpstreamHost>>,
        policy: HealthPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            matcher,
            hosts,
            policy,
            initial_count: AtomicI32::new(0),
            sweep: Mutex::new(None),
        }
    }

    pub fn hosts(&self) -> &[Arc<UpstreamHost>] {
        &self.hosts
    }

    /// Marks one in-flight initial load. Called by the external name-list
    /// loader before it starts priming this pool.
    pub fn begin_population(&self) {
        self.initial_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Balances a `begin_population` once the load finished.
    pub fn population_done(&self) {
        self.initial_count.fetch_sub(1, Ordering::Relaxed);
    }

    fn spawn_sweep(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if self.policy.check_interval.is_zero() || self.hosts.is_empty() {
            return token;
        }

        let cancelled = token.clone();
        let hosts = self.hosts.clone();
        let interval = self.policy.check_interval;
        let pool = self.name.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => sweep_once(&pool, &hosts).await,
                }
            }
        });
        token
    }
}

async fn sweep_once(pool: &str, hosts: &[Arc<UpstreamHost>]) {
    for host in hosts {
        match host.check().await {
            Ok(()) => {
                if host.fails() != 0 {
                    info!(pool, host = %host.endpoint(), "host passed liveness probe, clearing failures");
                }
                host.clear_fails();
            }
            Err(e) => {
                warn!(pool, host = %host.endpoint(), error = %e, "liveness probe failed");
                host.add_fails(1);
            }
        }
    }
}

impl Upstream for RedirUpstream {
    fn name(&self) -> &str {
        &self.name
    }

    fn match_name(&self, name: &str) -> bool {
        self.matcher.matches(name)
    }

    fn select(&self) -> Option<Arc<UpstreamHost>> {
        let max_fails = i64::from(self.policy.max_fails);
        let healthy: SmallVec<[&Arc<UpstreamHost>; 8]> = self
            .hosts
            .iter()
            .filter(|h| max_fails == 0 || i64::from(h.fails()) < max_fails)
            .collect();
        if healthy.is_empty() {
            return None;
        }
        Some(Arc::clone(healthy[fastrand::usize(..healthy.len())]))
    }

    fn start(&self) -> Result<(), RedirError> {
        let mut sweep = self
            .sweep
            .lock()
            .map_err(|_| RedirError::ConfigError(format!("pool {} lock poisoned", self.name)))?;
        if sweep.is_some() {
            debug!(pool = %self.name, "already started");
            return Ok(());
        }
        *sweep = Some(self.spawn_sweep());
        info!(pool = %self.name, hosts = self.hosts.len(), "upstream pool started");
        Ok(())
    }

    fn stop(&self) -> Result<(), RedirError> {
        let mut sweep = self
            .sweep
            .lock()
            .map_err(|_| RedirError::ConfigError(format!("pool {} lock poisoned", self.name)))?;
        match sweep.take() {
            Some(token) => {
                token.cancel();
                info!(pool = %self.name, "upstream pool stopped");
            }
            None => debug!(pool = %self.name, "already stopped"),
        }
        Ok(())
    }

    fn health_policy(&self) -> HealthPolicy {
        self.policy
    }

    fn populating(&self) -> bool {
        self.initial_count.load(Ordering::Relaxed) != 0
    }
}

impl Drop for RedirUpstream {
    fn drop(&mut self) {
        if let Ok(mut sweep) = self.sweep.lock() {
            if let Some(token) = sweep.take() {
                token.cancel();
            }
        }
    }
}

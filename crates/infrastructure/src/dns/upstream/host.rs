use dns_redir_application::{Exchanger, HealthProbe};
use dns_redir_domain::{RedirError, TransportFlags, UpstreamEndpoint};
use hickory_proto::op::Message;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// One backend resolver endpoint with its rolling failure counter.
///
/// The counter may transiently go negative: the detached decay task takes
/// a failure back off after the fail timeout, and a concurrent periodic
/// probe may already have cleared it. Decay and probes rectify it.
pub struct UpstreamHost {
    endpoint: UpstreamEndpoint,
    flags: TransportFlags,
    fails: AtomicI32,
    exchanger: Arc<dyn Exchanger>,
    probe: Arc<dyn HealthProbe>,
}

impl UpstreamHost {
    pub fn new(
        endpoint: UpstreamEndpoint,
        flags: TransportFlags,
        exchanger: Arc<dyn Exchanger>,
        probe: Arc<dyn HealthProbe>,
    ) -> Self {
        Self {
            endpoint,
            flags,
            fails: AtomicI32::new(0),
            exchanger,
            probe,
        }
    }

    pub fn endpoint(&self) -> &UpstreamEndpoint {
        &self.endpoint
    }

    pub fn force_tcp(&self) -> bool {
        self.flags.force_tcp
    }

    pub fn prefer_udp(&self) -> bool {
        self.flags.prefer_udp
    }

    pub fn fails(&self) -> i32 {
        self.fails.load(Ordering::Relaxed)
    }

    /// Adds `delta` to the failure counter and returns the new value.
    pub fn add_fails(&self, delta: i32) -> i32 {
        self.fails.fetch_add(delta, Ordering::Relaxed) + delta
    }

    /// Clears accumulated failures after a successful liveness probe.
    pub fn clear_fails(&self) {
        self.fails.store(0, Ordering::Relaxed);
    }

    pub async fn exchange(&self, request: &Message) -> Result<Message, RedirError> {
        let started = Instant::now();
        let outcome = self
            .exchanger
            .exchange(&self.endpoint, self.flags, request)
            .await;
        debug!(host = %self.endpoint, rtt = ?started.elapsed(), "exchange finished");
        outcome
    }

    pub async fn check(&self) -> Result<(), RedirError> {
        self.probe.check(&self.endpoint).await
    }
}

impl std::fmt::Debug for UpstreamHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamHost")
            .field("endpoint", &self.endpoint)
            .field("flags", &self.flags)
            .field("fails", &self.fails())
            .finish()
    }
}

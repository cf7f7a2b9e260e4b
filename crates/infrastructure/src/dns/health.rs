use super::upstream::{HealthPolicy, UpstreamHost};
use std::sync::Arc;
use tracing::debug;

/// A liveness probe fires on every `FAILS_PER_PROBE`th recorded failure,
/// not on every failure, so a burst of failing requests cannot turn into
/// a probe storm.
pub(crate) const FAILS_PER_PROBE: i32 = 3;

/// Failure-driven health-check escalation.
///
/// Skipped entirely when the pool has health checking disabled (zero
/// check interval or zero max-fails). Otherwise the host's failure
/// counter is bumped and a detached decay task takes the failure back off
/// after the fail timeout; the request path never waits on it. The probe
/// result is discarded.
pub fn health_check(host: &Arc<UpstreamHost>, policy: HealthPolicy) {
    if policy.check_interval.is_zero() || policy.max_fails == 0 {
        return;
    }

    let fails = host.add_fails(1);
    let host = Arc::clone(host);
    tokio::spawn(async move {
        tokio::time::sleep(policy.fail_timeout).await;
        // May drive the counter negative; decay and the periodic sweep
        // rectify it.
        host.add_fails(-1);
        if fails % FAILS_PER_PROBE == 0 {
            if let Err(e) = host.check().await {
                debug!(host = %host.endpoint(), error = %e, "liveness probe failed");
            }
        }
    });
}

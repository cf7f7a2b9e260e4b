use async_trait::async_trait;
use dns_redir_domain::{RedirError, UpstreamEndpoint};

/// Out-of-band liveness check of one upstream endpoint.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self, endpoint: &UpstreamEndpoint) -> Result<(), RedirError>;
}

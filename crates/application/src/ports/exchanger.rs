use async_trait::async_trait;
use dns_redir_domain::{RedirError, TransportFlags, UpstreamEndpoint};
use hickory_proto::op::Message;

/// One network round-trip against an upstream endpoint.
///
/// Implementations own the sockets and any connection cache; errors must
/// arrive pre-classified as `RedirError` transport variants.
/// `RedirError::CachedConnClosed` marks the reuse of a connection the peer
/// already closed (TCP only) and is retried against the same host.
#[async_trait]
pub trait Exchanger: Send + Sync {
    async fn exchange(
        &self,
        endpoint: &UpstreamEndpoint,
        flags: TransportFlags,
        request: &Message,
    ) -> Result<Message, RedirError>;
}

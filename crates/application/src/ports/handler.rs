use crate::request::RequestState;
use async_trait::async_trait;
use dns_redir_domain::RedirError;
use hickory_proto::op::Message;

/// Reply sink for one request. The redirector writes at most once.
#[async_trait]
pub trait ResponseWriter: Send {
    async fn write_reply(&mut self, reply: Message) -> Result<(), RedirError>;
}

/// One link in the externally-composed processing chain. `Ok(())` means a
/// reply was written; an error means nothing was written and the caller
/// should answer with a server failure.
#[async_trait]
pub trait DnsHandler: Send + Sync {
    async fn handle(
        &self,
        state: &RequestState,
        writer: &mut dyn ResponseWriter,
    ) -> Result<(), RedirError>;
}

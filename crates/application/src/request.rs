use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use std::net::SocketAddr;

/// Ephemeral per-request state: the original query, the client address and
/// the normalized name used for zone lookup.
#[derive(Debug, Clone)]
pub struct RequestState {
    message: Message,
    src: SocketAddr,
    name: String,
}

impl RequestState {
    pub fn new(message: Message, src: SocketAddr) -> Self {
        let name = message
            .queries()
            .first()
            .map(|q| normalize_name(&q.name().to_utf8()))
            .unwrap_or_default();
        Self { message, src, name }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn src(&self) -> SocketAddr {
        self.src
    }

    /// Normalized query name: lower-cased, single trailing dot stripped.
    pub fn lookup_name(&self) -> &str {
        &self.name
    }

    pub fn query(&self) -> Option<&Query> {
        self.message.queries().first()
    }

    /// Standard reply matching: transaction id plus question name
    /// (case-insensitive), type and class.
    pub fn matches_reply(&self, reply: &Message) -> bool {
        if reply.id() != self.message.id() {
            return false;
        }
        match (self.query(), reply.queries().first()) {
            (Some(ours), Some(theirs)) => {
                ours.name().to_lowercase() == theirs.name().to_lowercase()
                    && ours.query_type() == theirs.query_type()
                    && ours.query_class() == theirs.query_class()
            }
            (None, None) => true,
            _ => false,
        }
    }

    /// Locally synthesized format-error reply carrying the original
    /// id/question.
    pub fn formerr_reply(&self) -> Message {
        let mut reply = Message::new(
            self.message.id(),
            MessageType::Response,
            self.message.op_code(),
        );
        reply.set_response_code(ResponseCode::FormErr);
        for query in self.message.queries() {
            reply.add_query(query.clone());
        }
        reply
    }
}

/// Lower-cases and strips one trailing dot unless the name is the bare
/// root. Does not validate domain syntax; malformed names are the matched
/// upstream's problem.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_ascii_lowercase();
    if lowered.len() > 1 {
        if let Some(stripped) = lowered.strip_suffix('.') {
            return stripped.to_string();
        }
    }
    lowered
}

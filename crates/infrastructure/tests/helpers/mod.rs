#![allow(dead_code)]
use async_trait::async_trait;
use dns_redir_application::{DnsHandler, Exchanger, HealthProbe, RequestState, ResponseWriter};
use dns_redir_domain::{RedirError, TransportFlags, UpstreamEndpoint};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn endpoint(raw: &str) -> UpstreamEndpoint {
    raw.parse().expect("test endpoint should parse")
}

pub fn client_addr() -> SocketAddr {
    "127.0.0.1:5353".parse().unwrap()
}

pub fn query_message(id: u16, name: &str, record_type: RecordType) -> Message {
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(record_type);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    message
}

pub fn request_state(id: u16, name: &str) -> RequestState {
    RequestState::new(query_message(id, name, RecordType::A), client_addr())
}

/// A reply echoing the request's id and question, one A record per ttl.
pub fn echo_reply(request: &Message, ttls: &[u32]) -> Message {
    let mut reply = Message::new(request.id(), MessageType::Response, request.op_code());
    for q in request.queries() {
        reply.add_query(q.clone());
    }
    for (i, ttl) in ttls.iter().enumerate() {
        let name = request
            .queries()
            .first()
            .map(|q| q.name().clone())
            .unwrap_or_else(Name::root);
        let octet = u8::try_from(i % 250).unwrap();
        reply.add_answer(Record::from_rdata(
            name,
            *ttl,
            RData::A(A(std::net::Ipv4Addr::new(192, 0, 2, octet))),
        ));
    }
    reply
}

/// One scripted outcome of an `Exchanger::exchange` call.
#[derive(Debug, Clone)]
pub enum ExchangeStep {
    /// Valid reply matching the request, with the given answer TTLs.
    Succeed(Vec<u32>),
    /// Valid reply with the truncation bit set.
    Truncated,
    /// Reply whose transaction id does not match the request.
    WrongId,
    /// Cached connection closed by peer (retry-same-host class).
    ClosedConn,
    /// Generic transport failure.
    Timeout,
}

/// Fake transport scripted with per-call outcomes; once the script runs
/// dry every further call repeats the default step.
pub struct ScriptedExchanger {
    script: Mutex<VecDeque<ExchangeStep>>,
    default: ExchangeStep,
    calls: AtomicUsize,
}

impl ScriptedExchanger {
    pub fn new(steps: impl IntoIterator<Item = ExchangeStep>, default: ExchangeStep) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            default,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(step: ExchangeStep) -> Self {
        Self::new(std::iter::empty(), step)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Exchanger for ScriptedExchanger {
    async fn exchange(
        &self,
        endpoint: &UpstreamEndpoint,
        _flags: TransportFlags,
        request: &Message,
    ) -> Result<Message, RedirError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone());
        match step {
            ExchangeStep::Succeed(ttls) => Ok(echo_reply(request, &ttls)),
            ExchangeStep::Truncated => {
                let mut reply = echo_reply(request, &[60]);
                reply.set_truncated(true);
                Ok(reply)
            }
            ExchangeStep::WrongId => {
                let mut reply = echo_reply(request, &[60]);
                let mut header = *reply;
                header.set_id(request.id().wrapping_add(1));
                reply.set_header(header);
                Ok(reply)
            }
            ExchangeStep::ClosedConn => Err(RedirError::CachedConnClosed),
            ExchangeStep::Timeout => Err(RedirError::TransportTimeout {
                server: endpoint.to_string(),
            }),
        }
    }
}

/// Liveness probe counting its calls.
pub struct CountingProbe {
    calls: AtomicUsize,
    healthy: bool,
}

impl CountingProbe {
    pub fn healthy() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            healthy: true,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            healthy: false,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthProbe for CountingProbe {
    async fn check(&self, endpoint: &UpstreamEndpoint) -> Result<(), RedirError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy {
            Ok(())
        } else {
            Err(RedirError::TransportTimeout {
                server: endpoint.to_string(),
            })
        }
    }
}

/// Reply sink collecting everything written to it.
#[derive(Default)]
pub struct CollectingWriter {
    pub written: Vec<Message>,
}

impl CollectingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(&self) -> &Message {
        assert_eq!(self.written.len(), 1, "expected exactly one written reply");
        &self.written[0]
    }
}

#[async_trait]
impl ResponseWriter for CollectingWriter {
    async fn write_reply(&mut self, reply: Message) -> Result<(), RedirError> {
        self.written.push(reply);
        Ok(())
    }
}

/// Next-in-chain handler that records delegation and answers with an echo
/// reply.
#[derive(Default)]
pub struct RecordingNext {
    calls: AtomicUsize,
}

impl RecordingNext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsHandler for RecordingNext {
    async fn handle(
        &self,
        state: &RequestState,
        writer: &mut dyn ResponseWriter,
    ) -> Result<(), RedirError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        writer.write_reply(echo_reply(state.message(), &[60])).await
    }
}

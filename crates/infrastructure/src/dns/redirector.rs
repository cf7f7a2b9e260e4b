//! Request routing: zone matching and the deadline-bounded retry loop
//! against the matched upstream pool.

use super::health::health_check;
use super::population::PopulationLatch;
use super::rewrite::{rewrite_to_minimal_ttls, MINIMAL_DEFAULT_TTL};
use super::upstream::{Upstream, UpstreamHost};
use async_trait::async_trait;
use dns_redir_application::{DnsHandler, RequestState, ResponseWriter};
use dns_redir_domain::RedirError;
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Wall-clock budget for one redirected request, retries included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Routes matched queries to their upstream pool and everything else to
/// the next handler in the chain.
pub struct Redirector {
    upstreams: Vec<Arc<dyn Upstream>>,
    next: Option<Arc<dyn DnsHandler>>,
    request_timeout: Duration,
    population: PopulationLatch,
}

impl Redirector {
    pub fn new(upstreams: Vec<Arc<dyn Upstream>>) -> Self {
        Self {
            upstreams,
            next: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            population: PopulationLatch::new(),
        }
    }

    pub fn with_next(mut self, next: Arc<dyn DnsHandler>) -> Self {
        self.next = Some(next);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn upstreams(&self) -> &[Arc<dyn Upstream>] {
        &self.upstreams
    }

    /// Starts every pool in configuration order; the first failure
    /// short-circuits.
    pub fn on_startup(&self) -> Result<(), RedirError> {
        for upstream in &self.upstreams {
            upstream.start()?;
        }
        Ok(())
    }

    pub fn on_shutdown(&self) -> Result<(), RedirError> {
        for upstream in &self.upstreams {
            upstream.stop()?;
        }
        Ok(())
    }

    /// First pool whose zones accept `name`, in configuration order (not
    /// longest match), plus the elapsed lookup time.
    fn match_upstream(&self, name: &str) -> (Option<&Arc<dyn Upstream>>, Duration) {
        let started = Instant::now();
        for upstream in &self.upstreams {
            if upstream.match_name(name) {
                return (Some(upstream), started.elapsed());
            }
        }
        (None, started.elapsed())
    }

    /// Drives select → exchange → validate → deliver until success, a
    /// terminal failure, or the deadline.
    async fn dispatch(
        &self,
        state: &RequestState,
        writer: &mut dyn ResponseWriter,
        upstream: &Arc<dyn Upstream>,
        deadline: Instant,
    ) -> Result<(), RedirError> {
        let mut last_err: Option<RedirError> = None;

        while Instant::now() < deadline {
            let Some(host) = upstream.select() else {
                debug!(pool = %upstream.name(), "no healthy upstream host");
                return Err(RedirError::NoHealthyUpstream);
            };
            debug!(host = %host.endpoint(), "upstream host selected");

            match Self::exchange_with_host(&host, state, deadline).await {
                Err(err) => {
                    let policy = upstream.health_policy();
                    if policy.max_fails != 0 && !err.is_cached_conn_closed() {
                        warn!(host = %host.endpoint(), error = %err, "exchange failed");
                        health_check(&host, policy);
                    }
                    last_err = Some(err);
                }
                Ok(reply) => return self.deliver(state, writer, reply).await,
            }
        }

        let err = last_err
            .expect("retry loop exhausted the deadline with no upstream error recorded");
        Err(err)
    }

    /// One exchange against a host, retrying in place when the transport
    /// reports a cached connection the peer already closed. The retry has
    /// no cap of its own beyond the request deadline; a transport that
    /// pathologically keeps reporting the condition spins here until the
    /// deadline. A possible tightening point.
    async fn exchange_with_host(
        host: &Arc<UpstreamHost>,
        state: &RequestState,
        deadline: Instant,
    ) -> Result<Message, RedirError> {
        loop {
            match host.exchange(state.message()).await {
                Err(err) if err.is_cached_conn_closed() => {
                    debug!(host = %host.endpoint(), error = %err, "retrying exchange on the same host");
                    if Instant::now() >= deadline {
                        return Err(err);
                    }
                }
                Err(err) => return Err(err),
                Ok(reply) => {
                    if reply.truncated() && !host.force_tcp() && host.prefer_udp() {
                        warn!(
                            host = %host.endpoint(),
                            "response truncated with prefer_udp configured; retry over TCP is not implemented"
                        );
                    }
                    return Ok(reply);
                }
            }
        }
    }

    async fn deliver(
        &self,
        state: &RequestState,
        writer: &mut dyn ResponseWriter,
        mut reply: Message,
    ) -> Result<(), RedirError> {
        if !state.matches_reply(&reply) {
            debug!(
                id = reply.id(),
                qname = %state.lookup_name(),
                reply = ?reply,
                "reply does not match the question, answering FORMERR"
            );
            Self::write_reply(writer, state.formerr_reply()).await;
            return Ok(());
        }

        if self.population.in_progress(&self.upstreams) {
            rewrite_to_minimal_ttls(&mut reply, MINIMAL_DEFAULT_TTL);
        }
        Self::write_reply(writer, reply).await;
        Ok(())
    }

    async fn write_reply(writer: &mut dyn ResponseWriter, reply: Message) {
        if let Err(e) = writer.write_reply(reply).await {
            error!(error = %e, "failed to write reply");
        }
    }
}

#[async_trait]
impl DnsHandler for Redirector {
    async fn handle(
        &self,
        state: &RequestState,
        writer: &mut dyn ResponseWriter,
    ) -> Result<(), RedirError> {
        let name = state.lookup_name();
        let (matched, lookup) = self.match_upstream(name);
        let Some(upstream) = matched else {
            debug!(name = %name, lookup = ?lookup, "name not in any redirect zone");
            return match &self.next {
                Some(next) => next.handle(state, writer).await,
                None => Err(RedirError::NoNextHandler),
            };
        };
        debug!(name = %name, pool = %upstream.name(), lookup = ?lookup, "name matched redirect zone");

        let deadline = Instant::now() + self.request_timeout;
        self.dispatch(state, writer, upstream, deadline).await
    }
}

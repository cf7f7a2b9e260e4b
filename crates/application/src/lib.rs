//! dns-redir application layer: ports at the transport/handler seams and
//! the per-request state the redirector threads through them.
pub mod ports;
pub mod request;

pub use ports::{DnsHandler, Exchanger, HealthProbe, ResponseWriter};
pub use request::RequestState;

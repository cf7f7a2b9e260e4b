use crate::errors::RedirError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Transport used to reach an upstream resolver endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Udp,
    Tcp,
    Tls,
}

impl TransportKind {
    pub fn scheme(&self) -> &'static str {
        match self {
            TransportKind::Udp => "udp",
            TransportKind::Tcp => "tcp",
            TransportKind::Tls => "tls",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            TransportKind::Udp | TransportKind::Tcp => 53,
            TransportKind::Tls => 853,
        }
    }
}

/// Per-host transport preferences. `force_tcp` pins the exchange to TCP;
/// `prefer_udp` asks for UDP first with TCP reserved for truncation
/// fallback. The two are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportFlags {
    pub force_tcp: bool,
    pub prefer_udp: bool,
}

/// One upstream resolver endpoint, e.g. `udp://8.8.8.8:53` or
/// `tls://9.9.9.9:853`. A bare address parses as UDP on the scheme's
/// default port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpstreamEndpoint {
    pub kind: TransportKind,
    pub addr: SocketAddr,
}

impl UpstreamEndpoint {
    pub fn new(kind: TransportKind, addr: SocketAddr) -> Self {
        Self { kind, addr }
    }
}

impl FromStr for UpstreamEndpoint {
    type Err = RedirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = match s.split_once("://") {
            Some(("udp", rest)) => (TransportKind::Udp, rest),
            Some(("tcp", rest)) => (TransportKind::Tcp, rest),
            Some(("tls", rest)) => (TransportKind::Tls, rest),
            Some((scheme, _)) => {
                return Err(RedirError::InvalidEndpoint(format!(
                    "unsupported scheme '{}' in '{}'",
                    scheme, s
                )))
            }
            None => (TransportKind::Udp, s),
        };

        if let Ok(addr) = rest.parse::<SocketAddr>() {
            return Ok(Self { kind, addr });
        }
        if let Ok(ip) = rest.parse::<IpAddr>() {
            return Ok(Self {
                kind,
                addr: SocketAddr::new(ip, kind.default_port()),
            });
        }
        Err(RedirError::InvalidEndpoint(format!(
            "'{}' is not an ip or ip:port address",
            s
        )))
    }
}

impl fmt::Display for UpstreamEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.kind.scheme(), self.addr)
    }
}

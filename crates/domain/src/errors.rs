use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RedirError {
    #[error("no healthy upstream host")]
    NoHealthyUpstream,

    #[error("cached connection was closed by peer")]
    CachedConnClosed,

    #[error("no next handler in the chain")]
    NoNextHandler,

    #[error("transport timeout talking to {server}")]
    TransportTimeout { server: String },

    #[error("connection refused by {server}")]
    ConnectionRefused { server: String },

    #[error("connection reset by {server}")]
    ConnectionReset { server: String },

    #[error("transport failure talking to {server}: {detail}")]
    TransportIo { server: String, detail: String },

    #[error("failed to write reply: {0}")]
    WriteFailed(String),

    #[error("invalid upstream endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl RedirError {
    /// Closed cached connection is a transient, same-host-retriable
    /// condition distinct from host failure.
    pub fn is_cached_conn_closed(&self) -> bool {
        matches!(self, RedirError::CachedConnClosed)
    }

    /// Errors that count against a host's failure accounting.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            RedirError::TransportTimeout { .. }
                | RedirError::ConnectionRefused { .. }
                | RedirError::ConnectionReset { .. }
                | RedirError::TransportIo { .. }
        )
    }
}

mod host;
mod pool;

pub use host::UpstreamHost;
pub use pool::{HealthPolicy, RedirUpstream, Upstream};

pub mod builder;
pub mod health;
pub mod matcher;
pub mod population;
pub mod redirector;
pub mod rewrite;
pub mod upstream;

pub use builder::build_upstreams;
pub use matcher::ZoneMatcher;
pub use population::PopulationLatch;
pub use redirector::Redirector;
pub use rewrite::rewrite_to_minimal_ttls;
pub use upstream::{HealthPolicy, RedirUpstream, Upstream, UpstreamHost};

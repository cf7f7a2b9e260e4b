mod exchanger;
mod handler;
mod health_probe;

pub use exchanger::Exchanger;
pub use handler::{DnsHandler, ResponseWriter};
pub use health_probe::HealthProbe;

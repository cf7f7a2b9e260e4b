use super::upstream::Upstream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-way latch over the pools' initial-load counters.
///
/// Once every pool has finished its first population the latch flips to
/// finished and stays there for the life of the process; later checks are
/// O(1) and racing setters converge on the same terminal value.
#[derive(Debug, Default)]
pub struct PopulationLatch {
    finished: AtomicBool,
}

impl PopulationLatch {
    pub fn new() -> Self {
        Self {
            finished: AtomicBool::new(false),
        }
    }

    pub fn in_progress(&self, upstreams: &[Arc<dyn Upstream>]) -> bool {
        if self.finished.load(Ordering::Acquire) {
            return false;
        }
        if upstreams.iter().any(|u| u.populating()) {
            return true;
        }
        self.finished.store(true, Ordering::Release);
        false
    }
}

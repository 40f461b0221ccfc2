//! Clock
//!
//! Source of `last_updated` timestamps, injectable so tests can pin time.

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use jiff::{SignedDuration, Timestamp};

/// Time source for cart mutations.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Manually driven clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct FixedClock {
    nanos: Arc<AtomicI64>,
}

impl FixedClock {
    /// Clock frozen at `at`.
    pub fn new(at: Timestamp) -> Self {
        let nanos = i64::try_from(at.as_nanosecond()).unwrap_or(i64::MAX);

        Self {
            nanos: Arc::new(AtomicI64::new(nanos)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: SignedDuration) {
        let delta = i64::try_from(by.as_nanos()).unwrap_or(i64::MAX);

        self.nanos.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(Timestamp::UNIX_EPOCH)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanosecond(i128::from(self.nanos.load(Ordering::SeqCst)))
            .unwrap_or(Timestamp::MAX)
    }
}

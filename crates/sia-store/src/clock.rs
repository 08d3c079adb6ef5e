//! Time source for dispatch
//!
//! The store samples the clock once per dispatch and passes the instant to
//! the reducers. Tests and replays plug in a [`FixedClock`].

use parking_lot::Mutex;
use sia_model::Timestamp;
use std::fmt::Debug;

/// Source of `now`
pub trait Clock: Debug + Send + Sync {
    /// Current instant
    fn now(&self) -> Timestamp;
}

/// Wall clock (UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    at: Mutex<Timestamp>,
}

impl FixedClock {
    /// Clock frozen at `at`
    #[must_use]
    pub fn new(at: Timestamp) -> Self {
        Self { at: Mutex::new(at) }
    }

    /// Jump to `at`
    pub fn set(&self, at: Timestamp) {
        *self.at.lock() = at;
    }

    /// Move forward by `by`
    pub fn advance(&self, by: chrono::Duration) {
        let mut at = self.at.lock();
        *at += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.at.lock()
    }
}

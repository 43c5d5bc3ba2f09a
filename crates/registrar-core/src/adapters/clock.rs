//! # Clocks
//!
//! `TimeSource` implementations: the system clock and a settable clock for
//! tests and simulations.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::value_objects::UnixSeconds;
use crate::ports::outbound::TimeSource;

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> UnixSeconds {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or_default()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FixedClock {
    time: AtomicI64,
}

impl FixedClock {
    /// Creates a clock reading `initial`.
    #[must_use]
    pub fn new(initial: UnixSeconds) -> Self {
        Self {
            time: AtomicI64::new(initial),
        }
    }

    /// Moves the clock forward by `secs`.
    pub fn advance(&self, secs: i64) {
        self.time.fetch_add(secs, Ordering::SeqCst);
    }

    /// Sets the clock.
    pub fn set(&self, time: UnixSeconds) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> UnixSeconds {
        self.time.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock() {
        // After 2020-01-01
        assert!(SystemClock.now() > 1_577_836_800);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(1_000);
        assert_eq!(clock.now(), 1_000);
        clock.advance(60);
        assert_eq!(clock.now(), 1_060);
        clock.set(5);
        assert_eq!(clock.now(), 5);
    }
}

//! Time source abstraction.
//!
//! Expiration is decided against epoch seconds from an injected [`Clock`]
//! rather than ambient system time, so expiry behavior can be driven
//! deterministically in tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time as seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_epoch_secs(&self) -> i64;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_epoch_secs: i64) -> Self {
        Self {
            now: AtomicI64::new(start_epoch_secs),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, epoch_secs: i64) {
        self.now.store(epoch_secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Calendar date of the clock's current instant (UTC).
pub fn current_date(clock: &dyn Clock) -> time::Date {
    time::OffsetDateTime::from_unix_timestamp(clock.now_epoch_secs())
        .unwrap_or(time::OffsetDateTime::UNIX_EPOCH)
        .date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_epoch_secs(), 1_000);
        clock.advance_secs(1801);
        assert_eq!(clock.now_epoch_secs(), 2_801);
        clock.set(50);
        assert_eq!(clock.now_epoch_secs(), 50);
    }

    #[test]
    fn test_current_date_from_epoch_secs() {
        // 2025-11-17T12:00:00Z
        let clock = ManualClock::new(1_763_380_800);
        assert_eq!(current_date(&clock), date!(2025 - 11 - 17));
    }

    #[test]
    fn test_system_clock_is_past_2020() {
        assert!(SystemClock.now_epoch_secs() > 1_577_836_800);
    }
}

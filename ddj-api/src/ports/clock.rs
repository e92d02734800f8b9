//! Time port for testable time operations.
//!
//! `ddj-core`'s round/draw/settlement math takes `now_ms`/`round_id` as
//! plain arguments and never reads the clock itself. This port is how the
//! service layer supplies that argument, so integration tests can drive a
//! round through its full lifecycle (open -> closed -> settleable) without
//! sleeping in real time.

use chrono::{DateTime, Utc};

/// Port for time operations.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Current Unix timestamp in milliseconds, the unit `ddj-core`'s round
    /// and draw functions operate on.
    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Production clock backed by real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fake clock for integration tests: set to a fixed time, advanced
/// explicitly by the test instead of via `tokio::time::sleep`.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug)]
pub struct FakeClock {
    millis: std::sync::atomic::AtomicI64,
}

#[cfg(any(test, feature = "test-utils"))]
impl FakeClock {
    /// Create a fake clock fixed at `millis` (Unix epoch milliseconds).
    #[must_use]
    pub fn new(millis: i64) -> Self {
        Self {
            millis: std::sync::atomic::AtomicI64::new(millis),
        }
    }

    /// Advance the clock by `delta_ms` milliseconds.
    pub fn advance_ms(&self, delta_ms: i64) {
        self.millis
            .fetch_add(delta_ms, std::sync::atomic::Ordering::SeqCst);
    }

    /// Set the clock to an absolute millisecond value.
    pub fn set_ms(&self, millis: i64) {
        self.millis.store(millis, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(std::sync::atomic::Ordering::SeqCst))
            .unwrap_or_default()
    }

    fn now_ms(&self) -> i64 {
        self.millis.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn fake_clock_advances_deterministically() {
        let clock = FakeClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        clock.advance_ms(500);
        assert_eq!(clock.now_ms(), 1_500);
        clock.set_ms(0);
        assert_eq!(clock.now_ms(), 0);
    }
}

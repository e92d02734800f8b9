//! In-memory, per-IP rate limiter for gift-code redemption.
//!
//! A concurrent map keyed by client IP, fixed 60-second windows, 5
//! attempts per window. A background sweeper evicts expired entries so
//! the map stays bounded under normal load -- the teacher's `dashmap`
//! dependency gives us a striped-lock concurrent hash table for this
//! without hand-rolling one.

use std::net::IpAddr;
use std::time::Duration;

use dashmap::DashMap;

/// Attempts allowed per window.
pub const LIMIT: u32 = 5;
/// Window length, in milliseconds.
pub const WINDOW_MS: i64 = 60_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at_ms: i64,
}

/// Result of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request allowed.
    Allowed,
    /// Request rejected; retry after this many seconds.
    Limited { retry_after_secs: u64 },
}

/// Process-wide rate limiter. One instance lives in [`crate::state::AppState`].
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<IpAddr, Window>,
}

impl RateLimiter {
    /// Create an empty limiter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Record an attempt from `ip` at `now_ms`, fixed 60-second windows.
    pub fn check(&self, ip: IpAddr, now_ms: i64) -> RateDecision {
        let mut entry = self.windows.entry(ip).or_insert(Window {
            count: 0,
            reset_at_ms: now_ms + WINDOW_MS,
        });

        if now_ms >= entry.reset_at_ms {
            entry.count = 0;
            entry.reset_at_ms = now_ms + WINDOW_MS;
        }

        if entry.count >= LIMIT {
            let retry_after_secs = u64::try_from((entry.reset_at_ms - now_ms).max(0) / 1000 + 1)
                .unwrap_or(0);
            return RateDecision::Limited { retry_after_secs };
        }

        entry.count += 1;
        RateDecision::Allowed
    }

    /// Remove windows that expired at least one window ago. Intended to be
    /// called from a periodic background task.
    pub fn sweep(&self, now_ms: i64) {
        self.windows.retain(|_, w| w.reset_at_ms + WINDOW_MS > now_ms);
    }

    /// Number of tracked IPs, for diagnostics/tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether the limiter currently tracks no IPs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Spawn the periodic sweep task. Runs until the returned handle is
/// dropped or aborted.
pub fn spawn_sweeper(limiter: std::sync::Arc<RateLimiter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let now_ms = chrono::Utc::now().timestamp_millis();
            limiter.sweep(now_ms);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip() -> IpAddr {
        "127.0.0.1".parse().unwrap()
    }

    #[test]
    fn allows_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new();
        for _ in 0..LIMIT {
            assert_eq!(limiter.check(ip(), 0), RateDecision::Allowed);
        }
        match limiter.check(ip(), 0) {
            RateDecision::Limited { retry_after_secs } => assert!(retry_after_secs > 0),
            RateDecision::Allowed => panic!("expected rate limit to trigger"),
        }
    }

    #[test]
    fn window_resets_after_sixty_seconds() {
        let limiter = RateLimiter::new();
        for _ in 0..LIMIT {
            limiter.check(ip(), 0);
        }
        assert_eq!(limiter.check(ip(), 0), RateDecision::Limited { retry_after_secs: 1 });
        assert_eq!(limiter.check(ip(), WINDOW_MS), RateDecision::Allowed);
    }

    #[test]
    fn separate_ips_have_independent_windows() {
        let limiter = RateLimiter::new();
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();
        for _ in 0..LIMIT {
            assert_eq!(limiter.check(a, 0), RateDecision::Allowed);
        }
        assert_eq!(limiter.check(b, 0), RateDecision::Allowed);
    }

    #[test]
    fn sweep_evicts_long_expired_windows() {
        let limiter = RateLimiter::new();
        limiter.check(ip(), 0);
        assert_eq!(limiter.len(), 1);
        limiter.sweep(WINDOW_MS * 2 + 1);
        assert_eq!(limiter.len(), 0);
    }
}

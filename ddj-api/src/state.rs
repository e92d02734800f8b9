//! Shared application state handed to every handler via `axum::extract::State`.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Settings;
use crate::ports::Clock;
use crate::ratelimit::RateLimiter;

/// Everything a handler needs, cheaply `Clone`-able (an `Arc` bundle).
#[derive(Clone)]
pub struct AppState {
    /// Connection pool; every store/service method borrows from this.
    pub pool: PgPool,
    /// Immutable settings loaded at startup (the mutable round timing
    /// sub-slice is itself an atomically-swapped snapshot inside).
    pub settings: Arc<Settings>,
    /// Per-IP redemption rate limiter.
    pub rate_limiter: Arc<RateLimiter>,
    /// Time source, swappable in tests.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Current time in Unix epoch milliseconds, per the configured clock.
    #[must_use]
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

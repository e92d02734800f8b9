//! Round-Time Engine (RTE): a pure function of wall-clock time and three
//! configuration parameters that produces the current round's identity and
//! timing window.
//!
//! Nothing in this module reads the clock itself — callers supply `now_ms`
//! (typically from a `Clock` port in `ddj-api`) so the whole engine stays
//! deterministic and unit-testable.

use serde::{Deserialize, Serialize};

/// Lower bound on `round_seconds`: rounds shorter than this are rejected by
/// [`RoundConfig::clamp`].
pub const MIN_ROUND_SECONDS: u64 = 30;

/// Mutable timing parameters for the round engine.
///
/// Held by the service behind a single atomically-swapped snapshot so
/// concurrent readers never observe a torn combination of fields (see the
/// "process-wide mutable timing" design note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Duration of one round, in seconds.
    pub round_seconds: u64,
    /// Seconds before round end after which new bets are rejected.
    pub close_bets_at: u64,
    /// Unix epoch milliseconds that round 0 starts at.
    pub anchor_ms: i64,
}

impl RoundConfig {
    /// Apply the guardrails from the spec: `round_seconds` floored at
    /// [`MIN_ROUND_SECONDS`], `close_bets_at` floored at 1 and capped below
    /// `round_seconds`. A missing or unparsable anchor is handled by the
    /// caller (config loading resets it to `now_ms` before this ever runs).
    #[must_use]
    pub fn clamp(mut self) -> Self {
        if self.round_seconds < MIN_ROUND_SECONDS {
            self.round_seconds = MIN_ROUND_SECONDS;
        }
        if self.close_bets_at < 1 {
            self.close_bets_at = 1;
        }
        if self.close_bets_at >= self.round_seconds {
            self.close_bets_at = self.round_seconds - 1;
        }
        self
    }
}

/// A point-in-time snapshot of the round engine: identity plus timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    /// Monotonic round identifier.
    pub round_id: u64,
    /// Round start, Unix epoch milliseconds.
    pub start_ms: i64,
    /// Round end, Unix epoch milliseconds.
    pub end_ms: i64,
    /// Instant after which bets are rejected, Unix epoch milliseconds.
    pub close_at_ms: i64,
    /// Whether new bets are currently accepted.
    pub bets_open: bool,
    /// Seconds remaining until the round ends (ceil, floor at 0).
    pub seconds_left: u64,
    /// Seconds remaining until betting closes (ceil, floor at 0).
    pub seconds_to_close: u64,
}

/// Compute the round covering `now_ms` under `config`.
#[must_use]
pub fn round_info(config: &RoundConfig, now_ms: i64) -> RoundInfo {
    let round_ms = i64::try_from(config.round_seconds.saturating_mul(1000)).unwrap_or(i64::MAX);
    let elapsed = now_ms.saturating_sub(config.anchor_ms);
    let round_id = elapsed.div_euclid(round_ms.max(1));
    round_by_id(config, round_id.max(0).unsigned_abs(), now_ms)
}

/// Compute the round identified by `round_id`, evaluated as of `now_ms`.
#[must_use]
pub fn round_by_id(config: &RoundConfig, round_id: u64, now_ms: i64) -> RoundInfo {
    let round_ms = i64::try_from(config.round_seconds.saturating_mul(1000)).unwrap_or(i64::MAX);
    let close_window_ms =
        i64::try_from(config.close_bets_at.saturating_mul(1000)).unwrap_or(i64::MAX);

    let start_ms = config
        .anchor_ms
        .saturating_add(i64::try_from(round_id).unwrap_or(i64::MAX).saturating_mul(round_ms));
    let end_ms = start_ms.saturating_add(round_ms);
    let close_at_ms = end_ms.saturating_sub(close_window_ms);

    // Tie-break: at now == close_at, bets_open is false.
    let bets_open = now_ms < close_at_ms;

    let seconds_left = ceil_seconds(end_ms.saturating_sub(now_ms).max(0));
    let seconds_to_close = ceil_seconds(close_at_ms.saturating_sub(now_ms).max(0));

    RoundInfo {
        round_id,
        start_ms,
        end_ms,
        close_at_ms,
        bets_open,
        seconds_left,
        seconds_to_close,
    }
}

fn ceil_seconds(ms: i64) -> u64 {
    let ms = ms.max(0);
    u64::try_from((ms + 999) / 1000).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RoundConfig {
        RoundConfig {
            round_seconds: 300,
            close_bets_at: 30,
            anchor_ms: 0,
        }
    }

    #[test]
    fn round_id_is_monotonic() {
        let cfg = config();
        let a = round_info(&cfg, 1_000);
        let b = round_info(&cfg, 900_000);
        assert!(a.round_id <= b.round_id);
    }

    #[test]
    fn bets_open_transitions_once() {
        let cfg = config();
        let round = round_by_id(&cfg, 0, 0);
        assert!(round.bets_open);

        let at_close = round_by_id(&cfg, 0, round.close_at_ms);
        assert!(!at_close.bets_open, "tie-break: now == closeAt is closed");

        let past_close = round_by_id(&cfg, 0, round.close_at_ms + 1);
        assert!(!past_close.bets_open);
    }

    #[test]
    fn seconds_left_counts_down_to_zero() {
        let cfg = config();
        let round = round_by_id(&cfg, 0, cfg.round_seconds as i64 * 1000 - 1);
        assert_eq!(round.seconds_left, 1);

        let at_end = round_by_id(&cfg, 0, cfg.round_seconds as i64 * 1000);
        assert_eq!(at_end.seconds_left, 0);
    }

    #[test]
    fn close_bets_at_clamped_below_round_seconds() {
        let cfg = RoundConfig {
            round_seconds: 60,
            close_bets_at: 60,
            anchor_ms: 0,
        }
        .clamp();
        assert_eq!(cfg.close_bets_at, 59);
    }

    #[test]
    fn round_seconds_floored_at_minimum() {
        let cfg = RoundConfig {
            round_seconds: 5,
            close_bets_at: 1,
            anchor_ms: 0,
        }
        .clamp();
        assert_eq!(cfg.round_seconds, MIN_ROUND_SECONDS);
    }

    #[test]
    fn round_by_id_matches_round_info_at_boundary() {
        let cfg = config();
        let info = round_info(&cfg, 305_000);
        let by_id = round_by_id(&cfg, info.round_id, 305_000);
        assert_eq!(info, by_id);
    }
}

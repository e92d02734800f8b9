//! Per-endpoint request/response shapes.
//!
//! Each request is an explicit, exhaustively-validated struct rather than
//! ad-hoc JSON probing, per the "dynamic request bodies" design note --
//! `serde` rejects the wrong shape before a handler ever runs, and the
//! handler's own validation (via `ddj-core`) covers ranges `serde` can't
//! express.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// `POST /api/player/signup`
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Desired username; trimmed and length-checked by `ddj_core::player`.
    pub username: String,
}

/// `POST /api/player/redeem`
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    /// Redeeming player's id.
    pub player_id: Uuid,
    /// Plaintext gift code.
    pub code: String,
}

/// `POST /api/bet`
#[derive(Debug, Deserialize)]
pub struct PlaceBetRequest {
    /// Betting player's id.
    pub player_id: Uuid,
    /// Chosen numbers, prior to dedup/sort/range validation.
    pub nums: Vec<i64>,
    /// Chosen chance digit, prior to range validation.
    pub chance: i64,
    /// Stake, DOS minor units, prior to positivity validation.
    pub amount: i64,
}

/// Query string for `GET /api/player/{id}/ledger`.
#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// Row cap, clamped to `[1, 200]`, default 50.
    pub limit: Option<i64>,
}

/// Query string for `GET /api/leaderboard`.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Row cap, clamped to `[1, 100]`, default 20.
    pub limit: Option<i64>,
}

/// `PUT /api/admin/config`
#[derive(Debug, Deserialize)]
pub struct UpdateRoundConfigRequest {
    /// New round length, in seconds.
    pub round_seconds: Option<u64>,
    /// New betting cutoff, in seconds before round end.
    pub close_bets_at: Option<u64>,
    /// New anchor, Unix epoch milliseconds.
    pub anchor_ms: Option<i64>,
}

/// `POST /api/admin/gift-codes`
#[derive(Debug, Deserialize)]
pub struct GenerateGiftCodesRequest {
    /// Number of codes to generate.
    pub count: u32,
    /// Value each code credits on redemption, DOS minor units.
    pub value: i64,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

/// `POST /api/admin/settle`
#[derive(Debug, Deserialize, Default)]
pub struct SettleRequest {
    /// Round to settle; defaults to `currentRoundId - 1` if omitted.
    pub round_id: Option<i64>,
}

//! Row types returned by the store layer.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from `players`.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerRow {
    /// Primary key.
    pub id: Uuid,
    /// Unique, trimmed, >= 3 chars at insert time.
    pub username: String,
    /// Current balance, DOS minor units. Never negative.
    pub balance: i64,
    /// `"ACTIVE"` or `"SUSPENDED"`.
    pub status: String,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
    /// Last balance-affecting write.
    pub updated_at: DateTime<Utc>,
}

/// A row from `dos_ledger`.
#[derive(Debug, Clone, FromRow)]
pub struct LedgerEntryRow {
    /// Monotonic primary key.
    pub id: i64,
    /// Owning player, nullable for system-wide entries (none currently
    /// written by this service, but the column stays nullable per the
    /// spec's data model).
    pub player_id: Option<Uuid>,
    /// One of the `ledger_kind` constants.
    pub kind: String,
    /// Signed amount, DOS minor units.
    pub amount: i64,
    /// Opaque structured metadata (bet id, round id, category, ...).
    pub meta: serde_json::Value,
    /// Entry creation time.
    pub created_at: DateTime<Utc>,
}

/// A row from `bets`.
#[derive(Debug, Clone, FromRow)]
pub struct BetRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning player.
    pub player_id: Uuid,
    /// Round this bet was placed in.
    pub round_id: i64,
    /// Chosen numbers, sorted/unique, stored as `SMALLINT[]`.
    pub nums: Vec<i16>,
    /// Chosen chance digit.
    pub chance: i16,
    /// Stake, DOS minor units.
    pub amount: i64,
    /// Credited payout; 0 unless settled and a winner.
    pub payout: i64,
    /// Prize category key (e.g. `"4+1"`), `None` if unsettled or a loser.
    pub category: Option<String>,
    /// Whether settlement has processed this bet.
    pub settled: bool,
    /// Bet creation time.
    pub created_at: DateTime<Utc>,
}

/// A row from `gift_codes`.
#[derive(Debug, Clone, FromRow)]
pub struct GiftCodeRow {
    /// Primary key.
    pub id: Uuid,
    /// Salted hash of the plaintext code; the plaintext is never stored.
    pub code_hash: String,
    /// Credited amount on redemption, DOS minor units.
    pub value: i64,
    /// `"ACTIVE"`, `"REDEEMED"`, or `"DISABLED"`.
    pub status: String,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Redeeming player, once redeemed.
    pub redeemed_by: Option<Uuid>,
    /// Redemption time, once redeemed.
    pub redeemed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A row from `round_results`.
#[derive(Debug, Clone, FromRow)]
pub struct RoundResultRow {
    /// Primary key; presence implies the round is closed and settled.
    pub round_id: i64,
    /// Drawn main numbers, `SMALLINT[]`, sorted ascending.
    pub outcome_main: Vec<i16>,
    /// Drawn chance digit.
    pub outcome_chance: i16,
    /// Settlement commit time.
    pub settled_at: DateTime<Utc>,
}

/// The single-row `game_bank` table: the running carry/admin balance.
#[derive(Debug, Clone, FromRow)]
pub struct GameBankRow {
    /// Always `1`; this table holds exactly one row.
    pub id: i16,
    /// Running carry balance rolled into the next round's allocation base.
    pub carry_dos: i64,
    /// Cumulative house take across all settled rounds.
    pub admin_balance_dos: i64,
    /// Last settlement that touched this row.
    pub updated_at: DateTime<Utc>,
}

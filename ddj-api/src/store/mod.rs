//! Data persistence layer: `PostgreSQL` via `SQLx`.
//!
//! Mutating queries take an explicit `&mut PgConnection` (which a
//! `Transaction<'_, Postgres>` derefs to) rather than reaching into a pool
//! themselves, so the *service* layer owns transaction boundaries --
//! `BEGIN` happens in the service, `COMMIT`/`ROLLBACK` happens via
//! `Transaction::commit` or drop. Read-only listing queries that never
//! need a lock (ledger history, the leaderboard, round lookups) take a
//! `&PgPool` directly.

pub mod models;
pub mod postgres;

pub use models::{BetRow, GameBankRow, GiftCodeRow, LedgerEntryRow, PlayerRow, RoundResultRow};
pub use postgres::PostgresStore;

/// Ledger entry kinds, as stored in `dos_ledger.kind`.
pub mod ledger_kind {
    /// Signup bonus credited at account creation.
    pub const BONUS_SIGNUP: &str = "BONUS_SIGNUP";
    /// Gift code redemption credit.
    pub const REDEEM: &str = "REDEEM";
    /// Stake debited when a bet is placed.
    pub const BET: &str = "BET";
    /// Prize credited at settlement.
    pub const WIN: &str = "WIN";
    /// Admin manual credit.
    pub const ADMIN_ADD: &str = "ADMIN_ADD";
    /// Admin manual balance overwrite.
    pub const ADMIN_SET: &str = "ADMIN_SET";
    /// Admin status change.
    pub const ADMIN_STATUS: &str = "ADMIN_STATUS";
}

/// Admin-ledger entry kinds, as stored in `admin_ledger.kind`.
pub mod admin_ledger_kind {
    /// Unallocated pot flowing into next round's carry.
    pub const CARRY: &str = "CARRY";
    /// The house's cut of a settled pot.
    pub const ADMIN_TAKE: &str = "ADMIN_TAKE";
}

/// Player and gift-code status values.
pub mod status {
    /// Player in good standing; may bet and redeem.
    pub const ACTIVE: &str = "ACTIVE";
    /// Player blocked from betting and redeeming.
    pub const SUSPENDED: &str = "SUSPENDED";
    /// Gift code not yet redeemed.
    pub const GIFT_ACTIVE: &str = "ACTIVE";
    /// Gift code already redeemed.
    pub const GIFT_REDEEMED: &str = "REDEEMED";
    /// Gift code manually disabled by an admin.
    pub const GIFT_DISABLED: &str = "DISABLED";
}

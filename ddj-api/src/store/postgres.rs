//! `PostgreSQL` query functions using `SQLx`.
//!
//! Every function below is generic over `sqlx::PgExecutor`, so the same
//! function runs against a bare `&PgPool` (for reads that need no lock) or
//! against a `&mut Transaction<'_, Postgres>` (for the multi-step,
//! row-locked mutations the bet/settlement/redeem pipelines need). The
//! service layer decides which to pass; this module never opens a
//! transaction itself.

use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use sqlx::postgres::PgPool;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::error::{AppError, InfraError};
use crate::store::models::{BetRow, GameBankRow, GiftCodeRow, LedgerEntryRow, PlayerRow, RoundResultRow};

/// Thin wrapper around the connection pool. Owns migrations and the
/// pool itself; all actual queries are the free functions in this module
/// so transactional callers can thread a `Transaction` through them.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Borrow the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from `ddj-api/migrations`.
    ///
    /// # Errors
    /// Returns an error if a migration fails to apply.
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| InfraError::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLAYERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Insert a new player. Maps a unique-constraint violation on `username`
/// to [`AppError::UsernameTaken`].
pub async fn insert_player<'c, E>(exec: E, username: &str, balance: i64) -> Result<PlayerRow, AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, PlayerRow>(
        r"
        INSERT INTO players (id, username, balance, status, created_at, updated_at)
        VALUES (gen_random_uuid(), $1, $2, 'ACTIVE', now(), now())
        RETURNING id, username, balance, status, created_at, updated_at
        ",
    )
    .bind(username)
    .bind(balance)
    .fetch_one(exec)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::UsernameTaken,
        _ => AppError::from(e),
    })
}

/// Fetch a player without locking, for read-only endpoints.
pub async fn get_player<'c, E>(exec: E, player_id: Uuid) -> Result<Option<PlayerRow>, AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PlayerRow>(
        "SELECT id, username, balance, status, created_at, updated_at FROM players WHERE id = $1",
    )
    .bind(player_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Lock a player row `FOR UPDATE` within the caller's transaction.
pub async fn lock_player<'c, E>(exec: E, player_id: Uuid) -> Result<Option<PlayerRow>, AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PlayerRow>(
        r"
        SELECT id, username, balance, status, created_at, updated_at
        FROM players WHERE id = $1 FOR UPDATE
        ",
    )
    .bind(player_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Overwrite a player's balance (the caller holds the row lock already).
pub async fn set_balance<'c, E>(exec: E, player_id: Uuid, new_balance: i64) -> Result<(), AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("UPDATE players SET balance = $2, updated_at = now() WHERE id = $1")
        .bind(player_id)
        .bind(new_balance)
        .execute(exec)
        .await?;
    Ok(())
}

/// Set a player's status (admin operation).
pub async fn set_status<'c, E>(exec: E, player_id: Uuid, status: &str) -> Result<(), AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("UPDATE players SET status = $2, updated_at = now() WHERE id = $1")
        .bind(player_id)
        .bind(status)
        .execute(exec)
        .await?;
    Ok(())
}

/// Active players ordered by balance descending, for the leaderboard.
pub async fn leaderboard(pool: &PgPool, limit: i64) -> Result<Vec<PlayerRow>, AppError> {
    let rows = sqlx::query_as::<_, PlayerRow>(
        r"
        SELECT id, username, balance, status, created_at, updated_at
        FROM players
        WHERE status = 'ACTIVE'
        ORDER BY balance DESC, id ASC
        LIMIT $1
        ",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// Append one ledger entry. Returns the new entry's id.
pub async fn insert_ledger<'c, E>(
    exec: E,
    player_id: Option<Uuid>,
    kind: &str,
    amount: i64,
    meta: Json,
) -> Result<i64, AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    let (id,): (i64,) = sqlx::query_as(
        r"
        INSERT INTO dos_ledger (player_id, kind, amount, meta, created_at)
        VALUES ($1, $2, $3, $4, now())
        RETURNING id
        ",
    )
    .bind(player_id)
    .bind(kind)
    .bind(amount)
    .bind(meta)
    .fetch_one(exec)
    .await?;
    Ok(id)
}

/// List a player's ledger entries, newest first.
pub async fn list_ledger(pool: &PgPool, player_id: Uuid, limit: i64) -> Result<Vec<LedgerEntryRow>, AppError> {
    let rows = sqlx::query_as::<_, LedgerEntryRow>(
        r"
        SELECT id, player_id, kind, amount, meta, created_at
        FROM dos_ledger
        WHERE player_id = $1
        ORDER BY id DESC
        LIMIT $2
        ",
    )
    .bind(player_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ═══════════════════════════════════════════════════════════════════════════════
// BETS
// ═══════════════════════════════════════════════════════════════════════════════

/// Insert a new, unsettled bet.
pub async fn insert_bet<'c, E>(
    exec: E,
    player_id: Uuid,
    round_id: i64,
    nums: &[i16],
    chance: i16,
    amount: i64,
) -> Result<Uuid, AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    let (id,): (Uuid,) = sqlx::query_as(
        r"
        INSERT INTO bets (id, player_id, round_id, nums, chance, amount, payout, category, settled, created_at)
        VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, 0, NULL, false, now())
        RETURNING id
        ",
    )
    .bind(player_id)
    .bind(round_id)
    .bind(nums)
    .bind(chance)
    .bind(amount)
    .fetch_one(exec)
    .await?;
    Ok(id)
}

/// Lock every unsettled bet for a round, oldest first, for settlement.
pub async fn lock_unsettled_bets_for_round<'c, E>(exec: E, round_id: i64) -> Result<Vec<BetRow>, AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, BetRow>(
        r"
        SELECT id, player_id, round_id, nums, chance, amount, payout, category, settled, created_at
        FROM bets
        WHERE round_id = $1 AND settled = false
        ORDER BY id ASC
        FOR UPDATE
        ",
    )
    .bind(round_id)
    .fetch_all(exec)
    .await?;
    Ok(rows)
}

/// Mark one bet settled with its final payout/category.
pub async fn settle_bet<'c, E>(
    exec: E,
    bet_id: Uuid,
    payout: i64,
    category: Option<&str>,
) -> Result<(), AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        "UPDATE bets SET settled = true, payout = $2, category = $3 WHERE id = $1",
    )
    .bind(bet_id)
    .bind(payout)
    .bind(category)
    .execute(exec)
    .await?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// GIFT CODES
// ═══════════════════════════════════════════════════════════════════════════════

/// Insert a freshly generated gift code (plaintext is never persisted).
pub async fn insert_gift_code<'c, E>(
    exec: E,
    code_hash: &str,
    value: i64,
    expires_at: Option<DateTime<Utc>>,
) -> Result<Uuid, AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    let (id,): (Uuid,) = sqlx::query_as(
        r"
        INSERT INTO gift_codes (id, code_hash, value, status, expires_at, created_at)
        VALUES (gen_random_uuid(), $1, $2, 'ACTIVE', $3, now())
        RETURNING id
        ",
    )
    .bind(code_hash)
    .bind(value)
    .bind(expires_at)
    .fetch_one(exec)
    .await?;
    Ok(id)
}

/// Lock a gift code by its hash within the caller's transaction.
pub async fn lock_gift_code_by_hash<'c, E>(exec: E, code_hash: &str) -> Result<Option<GiftCodeRow>, AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = sqlx::query_as::<_, GiftCodeRow>(
        r"
        SELECT id, code_hash, value, status, expires_at, redeemed_by, redeemed_at, created_at
        FROM gift_codes WHERE code_hash = $1 FOR UPDATE
        ",
    )
    .bind(code_hash)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Mark a gift code redeemed by `player_id` at `now`.
pub async fn redeem_gift_code<'c, E>(
    exec: E,
    gift_code_id: Uuid,
    player_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        r"
        UPDATE gift_codes
        SET status = 'REDEEMED', redeemed_by = $2, redeemed_at = $3
        WHERE id = $1
        ",
    )
    .bind(gift_code_id)
    .bind(player_id)
    .bind(now)
    .execute(exec)
    .await?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUND RESULTS / GAME BANK / ADMIN LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// Acquire the process-wide settlement mutex for `round_id` for the
/// duration of the caller's transaction. This must be taken before
/// checking for an existing [`RoundResultRow`], since that row does not
/// exist yet the first time a round is settled and so provides no lock
/// to contend on by itself.
pub async fn lock_round_settlement<'c, E>(exec: E, round_id: i64) -> Result<(), AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(round_id)
        .execute(exec)
        .await?;
    Ok(())
}

/// Fetch a round's result, if settlement has already run.
pub async fn get_round_result<'c, E>(exec: E, round_id: i64) -> Result<Option<RoundResultRow>, AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = sqlx::query_as::<_, RoundResultRow>(
        "SELECT round_id, outcome_main, outcome_chance, settled_at FROM round_results WHERE round_id = $1",
    )
    .bind(round_id)
    .fetch_optional(exec)
    .await?;
    Ok(row)
}

/// Record a round's outcome. Writes exactly once per `round_id`; the
/// caller is responsible for the idempotence check via
/// [`get_round_result`] + [`lock_round_settlement`] beforehand.
pub async fn insert_round_result<'c, E>(
    exec: E,
    round_id: i64,
    outcome_main: &[i16],
    outcome_chance: i16,
    settled_at: DateTime<Utc>,
) -> Result<(), AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        r"
        INSERT INTO round_results (round_id, outcome_main, outcome_chance, settled_at)
        VALUES ($1, $2, $3, $4)
        ",
    )
    .bind(round_id)
    .bind(outcome_main)
    .bind(outcome_chance)
    .bind(settled_at)
    .execute(exec)
    .await?;
    Ok(())
}

/// Lock the single `game_bank` row, creating it if this is the first
/// settlement the service has ever run.
pub async fn lock_game_bank<'c, E>(exec: E) -> Result<GameBankRow, AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    // `ON CONFLICT DO UPDATE` (rather than a no-op `DO NOTHING`) is what
    // makes the upsert itself take the row lock, so a concurrent
    // settlement blocks here rather than racing past the insert and
    // reading a stale row.
    let row = sqlx::query_as::<_, GameBankRow>(
        r"
        INSERT INTO game_bank (id, carry_dos, admin_balance_dos, updated_at)
        VALUES (1, 0, 0, now())
        ON CONFLICT (id) DO UPDATE SET id = game_bank.id
        RETURNING id, carry_dos, admin_balance_dos, updated_at
        ",
    )
    .fetch_one(exec)
    .await?;
    Ok(row)
}

/// Persist the post-settlement carry/admin balances.
pub async fn update_game_bank<'c, E>(
    exec: E,
    carry_dos: i64,
    admin_balance_dos: i64,
) -> Result<(), AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        r"
        UPDATE game_bank
        SET carry_dos = $1, admin_balance_dos = $2, updated_at = now()
        WHERE id = 1
        ",
    )
    .bind(carry_dos)
    .bind(admin_balance_dos)
    .execute(exec)
    .await?;
    Ok(())
}

/// Append an admin-ledger audit row (`CARRY` or `ADMIN_TAKE`).
pub async fn insert_admin_ledger<'c, E>(
    exec: E,
    kind: &str,
    amount: i64,
    meta: Json,
) -> Result<(), AppError>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("INSERT INTO admin_ledger (kind, amount, meta, created_at) VALUES ($1, $2, $3, now())")
        .bind(kind)
        .bind(amount)
        .bind(meta)
        .execute(exec)
        .await?;
    Ok(())
}

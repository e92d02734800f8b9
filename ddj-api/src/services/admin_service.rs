//! Admin operations: round-timing config updates and gift-code generation.
//!
//! Settlement itself lives in [`crate::services::settlement_service`]; it
//! is reachable from the same `/api/admin/settle` route but is large
//! enough to deserve its own module.

use chrono::{DateTime, Utc};
use ddj_core::draw::MIN_SEED_LEN;
use ddj_core::error::DomainError;
use ddj_core::giftcode::{code_hash, generate};
use ddj_core::round::RoundConfig;
use sqlx::PgPool;

use crate::config::RoundConfigSnapshot;
use crate::error::{AppError, Result};
use crate::store::postgres;

/// Requested changes to the round timing parameters. `None` fields leave
/// the current value untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundConfigUpdate {
    /// New round length, in seconds.
    pub round_seconds: Option<u64>,
    /// New betting cutoff, in seconds before round end.
    pub close_bets_at: Option<u64>,
    /// New anchor, Unix epoch milliseconds.
    pub anchor_ms: Option<i64>,
}

/// Apply `update` to `snapshot`, applying the spec's guardrails
/// (`round_seconds` floored at 30, `close_bets_at` floored at 1 and
/// capped below `round_seconds`), and return the resulting configuration.
#[must_use]
pub fn update_round_config(snapshot: &RoundConfigSnapshot, update: RoundConfigUpdate) -> RoundConfig {
    let current = snapshot.load();
    let next = RoundConfig {
        round_seconds: update.round_seconds.unwrap_or(current.round_seconds),
        close_bets_at: update.close_bets_at.unwrap_or(current.close_bets_at),
        anchor_ms: update.anchor_ms.unwrap_or(current.anchor_ms),
    }
    .clamp();
    snapshot.store(next);
    next
}

/// A freshly generated gift code, shown to the caller exactly once.
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    /// Plaintext code; never persisted.
    pub code: String,
    /// Value the code credits on redemption, DOS minor units.
    pub value: i64,
}

/// Generate `count` gift codes worth `value` DOS minor units each,
/// optionally expiring at `expires_at`.
///
/// # Errors
/// `DomainError::WeakSeed` if `seed` is missing or too short.
pub async fn generate_gift_codes(
    pool: &PgPool,
    seed: &[u8],
    count: u32,
    value: i64,
    expires_at: Option<DateTime<Utc>>,
) -> Result<Vec<GeneratedCode>> {
    if seed.len() < MIN_SEED_LEN {
        return Err(AppError::Domain(DomainError::WeakSeed));
    }

    let mut rng = rand::thread_rng();
    let mut generated = Vec::with_capacity(count as usize);
    let mut tx = pool.begin().await.map_err(AppError::from)?;

    for _ in 0..count {
        let code = generate(&mut rng);
        let hash = code_hash(seed, &code);
        postgres::insert_gift_code(&mut *tx, &hash, value, expires_at).await?;
        generated.push(GeneratedCode { code, value });
    }

    tx.commit().await.map_err(AppError::from)?;
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_clamps_close_bets_at_below_round_seconds() {
        let snapshot = RoundConfigSnapshot::new(RoundConfig {
            round_seconds: 300,
            close_bets_at: 30,
            anchor_ms: 0,
        });
        let updated = update_round_config(
            &snapshot,
            RoundConfigUpdate {
                round_seconds: Some(60),
                close_bets_at: Some(90),
                anchor_ms: None,
            },
        );
        assert_eq!(updated.round_seconds, 60);
        assert_eq!(updated.close_bets_at, 59);
        assert_eq!(snapshot.load(), updated);
    }

    #[test]
    fn update_leaves_unset_fields_untouched() {
        let snapshot = RoundConfigSnapshot::new(RoundConfig {
            round_seconds: 300,
            close_bets_at: 30,
            anchor_ms: 42,
        });
        let updated = update_round_config(&snapshot, RoundConfigUpdate::default());
        assert_eq!(updated.anchor_ms, 42);
        assert_eq!(updated.round_seconds, 300);
    }
}

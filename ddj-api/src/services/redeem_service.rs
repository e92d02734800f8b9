//! Gift-code redemption: validate format, hash under the secret seed,
//! then credit the player inside a row-locked transaction.
//!
//! IP rate limiting happens at the HTTP layer (see [`crate::ratelimit`])
//! before this function is ever called; it has no knowledge of the
//! network.

use chrono::{DateTime, Utc};
use ddj_core::draw::MIN_SEED_LEN;
use ddj_core::error::DomainError;
use ddj_core::giftcode::{code_hash, validate_format};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, InfraError, Result};
use crate::store::{ledger_kind, postgres, status};

/// Outcome of a successful redemption.
#[derive(Debug, Clone, Copy)]
pub struct RedeemOutcome {
    /// Value credited, DOS minor units.
    pub value: i64,
    /// Player's balance after the credit.
    pub balance: i64,
}

/// Redeem `code` for `player_id`.
///
/// # Errors
/// - `DomainError::MalformedCode` if the surface format is invalid.
/// - `DomainError::WeakSeed` if `seed` is missing or too short.
/// - `InfraError::PlayerNotFound` / `GiftCodeNotFound` if either is missing.
/// - `AppError::PlayerNotActive` if the player is suspended.
/// - `AppError::GiftCodeNotActive` / `GiftCodeExpired` on an unredeemable code.
pub async fn redeem(
    pool: &PgPool,
    player_id: Uuid,
    code: &str,
    seed: &[u8],
    now: DateTime<Utc>,
) -> Result<RedeemOutcome> {
    validate_format(code)?;
    if seed.len() < MIN_SEED_LEN {
        return Err(AppError::Domain(DomainError::WeakSeed));
    }
    let hash = code_hash(seed, code);

    let mut tx = pool.begin().await.map_err(AppError::from)?;

    let player = postgres::lock_player(&mut *tx, player_id)
        .await?
        .ok_or_else(|| AppError::Infra(InfraError::PlayerNotFound(player_id.to_string())))?;
    if player.status != status::ACTIVE {
        return Err(AppError::PlayerNotActive);
    }

    let gift_code = postgres::lock_gift_code_by_hash(&mut *tx, &hash)
        .await?
        .ok_or_else(|| AppError::Infra(InfraError::GiftCodeNotFound))?;

    if gift_code.status != status::GIFT_ACTIVE {
        return Err(AppError::GiftCodeNotActive);
    }
    if let Some(expires_at) = gift_code.expires_at {
        if now >= expires_at {
            return Err(AppError::GiftCodeExpired);
        }
    }

    let new_balance = player.balance + gift_code.value;
    postgres::set_balance(&mut *tx, player_id, new_balance).await?;
    postgres::redeem_gift_code(&mut *tx, gift_code.id, player_id, now).await?;
    postgres::insert_ledger(
        &mut *tx,
        Some(player_id),
        ledger_kind::REDEEM,
        gift_code.value,
        json!({ "giftCodeId": gift_code.id }),
    )
    .await?;

    tx.commit().await.map_err(AppError::from)?;

    Ok(RedeemOutcome {
        value: gift_code.value,
        balance: new_balance,
    })
}

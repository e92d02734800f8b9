//! Bet Pipeline (BP): validate, check the betting window, then debit and
//! record the stake inside a single row-locked transaction.

use ddj_core::bet::{choice_key, validate};
use ddj_core::error::DomainError;
use ddj_core::round::{round_info, RoundConfig};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, InfraError, Result};
use crate::store::{ledger_kind, postgres, status};

/// Result of successfully placing a bet.
#[derive(Debug, Clone)]
pub struct PlaceBetOutcome {
    /// Newly inserted bet's id.
    pub bet_id: Uuid,
    /// Round the bet was placed into.
    pub round_id: u64,
    /// Player's balance after the debit.
    pub balance: i64,
}

/// Place a bet for `player_id`.
///
/// # Errors
/// - Domain validation errors (`InvalidAmount`/`InvalidNums`/`InvalidChance`)
///   if the input fails shape/range checks.
/// - `DomainError::BettingClosed` if the round's betting window has closed.
/// - `InfraError::PlayerNotFound` if the player does not exist.
/// - `AppError::PlayerNotActive` if the player is suspended.
/// - `AppError::InsufficientBalance` if the stake exceeds the balance.
#[allow(clippy::too_many_arguments)]
pub async fn place_bet(
    pool: &PgPool,
    round_cfg: &RoundConfig,
    now_ms: i64,
    player_id: Uuid,
    nums: &[i64],
    chance: i64,
    amount: i64,
) -> Result<PlaceBetOutcome> {
    let valid = validate(nums, chance, amount)?;

    let round = round_info(round_cfg, now_ms);
    if !round.bets_open {
        return Err(AppError::Domain(DomainError::BettingClosed {
            round_id: round.round_id,
            seconds_to_close: round.seconds_to_close,
        }));
    }

    let mut tx = pool.begin().await.map_err(AppError::from)?;

    let player = postgres::lock_player(&mut *tx, player_id)
        .await?
        .ok_or_else(|| AppError::Infra(InfraError::PlayerNotFound(player_id.to_string())))?;

    if player.status != status::ACTIVE {
        return Err(AppError::PlayerNotActive);
    }
    if player.balance < valid.amount {
        return Err(AppError::InsufficientBalance);
    }

    let new_balance = player.balance - valid.amount;
    postgres::set_balance(&mut *tx, player_id, new_balance).await?;

    let nums_i16: Vec<i16> = valid.nums.iter().map(|&n| i16::from(n)).collect();
    let round_id_i64 = i64::try_from(round.round_id).unwrap_or(i64::MAX);
    let bet_id = postgres::insert_bet(
        &mut *tx,
        player_id,
        round_id_i64,
        &nums_i16,
        i16::from(valid.chance),
        valid.amount,
    )
    .await?;

    let choice = choice_key(&valid.nums, valid.chance);
    postgres::insert_ledger(
        &mut *tx,
        Some(player_id),
        ledger_kind::BET,
        -valid.amount,
        json!({ "betId": bet_id, "roundId": round.round_id, "choice": choice }),
    )
    .await?;

    tx.commit().await.map_err(AppError::from)?;

    Ok(PlaceBetOutcome {
        bet_id,
        round_id: round.round_id,
        balance: new_balance,
    })
}

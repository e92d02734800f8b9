//! Settlement Engine (SE) transactional shell: acquire locks, draw the
//! outcome, call `ddj_core::settlement::settle`, then apply the plan.
//!
//! All the actual pot-split/classification/proration math lives in
//! [`ddj_core::settlement`] as pure integer arithmetic; this module is
//! only responsible for the locking, idempotence, and row writes the
//! spec's eleven settlement steps describe.

use std::collections::HashMap;

use ddj_core::draw::{draw, Outcome};
use ddj_core::error::DomainError;
use ddj_core::round::{round_by_id, RoundConfig};
use ddj_core::settlement::{settle as settle_pure, Category, SettlementBet};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::store::{admin_ledger_kind, ledger_kind, postgres};

/// Outcome of a settlement request.
#[derive(Debug, Clone)]
pub struct SettleOutcome {
    /// The round that was settled (or found already settled).
    pub round_id: u64,
    /// Whether a prior call already settled this round. When `true`, no
    /// writes happened on this call.
    pub already_settled: bool,
    /// The drawn outcome for the round.
    pub outcome: Outcome,
}

/// Settle `round_id` under `round_cfg`, as observed at `now_ms`.
///
/// # Errors
/// - `DomainError::RoundNotEnded` if `now_ms` is before the round's end.
/// - `DomainError::WeakSeed` if `seed` is missing or too short.
/// - Infra errors from the database layer; any failure rolls the
///   transaction back with no partial credit.
pub async fn settle(
    pool: &PgPool,
    round_cfg: &RoundConfig,
    now_ms: i64,
    round_id: u64,
    seed: &[u8],
) -> Result<SettleOutcome> {
    let round = round_by_id(round_cfg, round_id, now_ms);
    if now_ms < round.end_ms {
        return Err(AppError::Domain(DomainError::RoundNotEnded {
            round_id,
            seconds_left: round.seconds_left,
        }));
    }

    let round_id_i64 = i64::try_from(round_id).unwrap_or(i64::MAX);

    let mut tx = pool.begin().await.map_err(AppError::from)?;

    // Step 1: idempotence. The advisory lock serializes concurrent
    // settle() calls for the same round_id even before round_results has
    // a row to lock with FOR UPDATE.
    postgres::lock_round_settlement(&mut *tx, round_id_i64).await?;

    if let Some(existing) = postgres::get_round_result(&mut *tx, round_id_i64).await? {
        tx.commit().await.map_err(AppError::from)?;
        return Ok(SettleOutcome {
            round_id,
            already_settled: true,
            outcome: row_to_outcome(&existing),
        });
    }

    // Step 2: draw.
    let outcome = draw(seed, round_id).map_err(AppError::Domain)?;

    // Step 3: load bets under lock.
    let bet_rows = postgres::lock_unsettled_bets_for_round(&mut *tx, round_id_i64).await?;
    let bets: Vec<SettlementBet<Uuid>> = bet_rows
        .iter()
        .map(|b| SettlementBet {
            bet_id: b.id,
            player_id: b.player_id,
            amount: b.amount,
            nums: b.nums.iter().map(|&n| u8::try_from(n).unwrap_or(0)).collect(),
            chance: u8::try_from(b.chance).unwrap_or(0),
        })
        .collect();

    let bank = postgres::lock_game_bank(&mut *tx).await?;

    // Steps 4-7: pure settlement math.
    let plan = settle_pure(&bets, outcome, bank.carry_dos);

    // Step 8: apply winner credits and mark every bet settled.
    let mut category_by_bet: HashMap<Uuid, Option<Category>> = HashMap::new();
    for o in &plan.bet_outcomes {
        category_by_bet.insert(o.bet_id, o.category);
    }

    for (&player_id, &credit) in &plan.player_credits {
        if credit == 0 {
            continue;
        }
        let player = postgres::lock_player(&mut *tx, player_id)
            .await?
            .ok_or_else(|| {
                AppError::Infra(crate::error::InfraError::PlayerNotFound(player_id.to_string()))
            })?;
        postgres::set_balance(&mut *tx, player_id, player.balance + credit).await?;
        postgres::insert_ledger(
            &mut *tx,
            Some(player_id),
            ledger_kind::WIN,
            credit,
            json!({ "roundId": round_id }),
        )
        .await?;
    }

    for o in &plan.bet_outcomes {
        let category = category_by_bet
            .get(&o.bet_id)
            .copied()
            .flatten()
            .map(Category::as_str);
        postgres::settle_bet(&mut *tx, o.bet_id, o.payout, category).await?;
    }

    // Step 9: bank the admin take and the new carry balance. The running
    // total in `game_bank` is the single source of truth (see DESIGN.md);
    // the admin_ledger rows are this round's audit-trail delta.
    postgres::update_game_bank(&mut *tx, plan.carry_out, bank.admin_balance_dos + plan.admin_take)
        .await?;
    postgres::insert_admin_ledger(
        &mut *tx,
        admin_ledger_kind::CARRY,
        plan.carry_out - plan.carry_in,
        json!({ "roundId": round_id }),
    )
    .await?;
    postgres::insert_admin_ledger(
        &mut *tx,
        admin_ledger_kind::ADMIN_TAKE,
        plan.admin_take,
        json!({ "roundId": round_id }),
    )
    .await?;

    // Step 10: record the round result.
    let outcome_main: Vec<i16> = outcome.main.iter().map(|&n| i16::from(n)).collect();
    let settled_at = chrono::DateTime::from_timestamp_millis(now_ms).unwrap_or_else(chrono::Utc::now);
    postgres::insert_round_result(
        &mut *tx,
        round_id_i64,
        &outcome_main,
        i16::from(outcome.chance),
        settled_at,
    )
    .await?;

    // Step 11: commit.
    tx.commit().await.map_err(AppError::from)?;

    Ok(SettleOutcome {
        round_id,
        already_settled: false,
        outcome,
    })
}

fn row_to_outcome(row: &crate::store::RoundResultRow) -> Outcome {
    let mut main = [0u8; 4];
    for (i, slot) in main.iter_mut().enumerate() {
        *slot = row.outcome_main.get(i).and_then(|&n| u8::try_from(n).ok()).unwrap_or(0);
    }
    Outcome {
        main,
        chance: u8::try_from(row.outcome_chance).unwrap_or(0),
    }
}

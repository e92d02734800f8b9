//! `POST /api/bet`

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::dto::PlaceBetRequest;
use crate::error::ApiError;
use crate::services::bet_service;
use crate::state::AppState;

/// Place a bet for the current round.
pub async fn place_bet(
    State(state): State<AppState>,
    Json(req): Json<PlaceBetRequest>,
) -> Result<Json<Value>, ApiError> {
    let round_cfg = state.settings.round.load();
    let now_ms = state.now_ms();

    let outcome = bet_service::place_bet(
        &state.pool,
        &round_cfg,
        now_ms,
        req.player_id,
        &req.nums,
        req.chance,
        req.amount,
    )
    .await
    .map_err(ApiError::from)?;

    Ok(Json(json!({
        "ok": true,
        "betId": outcome.bet_id,
        "roundId": outcome.round_id,
        "balance": outcome.balance,
    })))
}

//! `/api/admin/*`: timing config, gift-code generation, and settlement.
//! Every route here sits behind [`crate::api::auth::require_admin_key`].

use axum::extract::State;
use axum::Json;
use ddj_core::round::round_info;
use serde_json::{json, Value};

use crate::api::dto::{GenerateGiftCodesRequest, SettleRequest, UpdateRoundConfigRequest};
use crate::error::ApiError;
use crate::services::{admin_service, settlement_service};
use crate::state::AppState;

/// `GET /api/admin/config`
pub async fn get_config(State(state): State<AppState>) -> Json<Value> {
    let cfg = state.settings.round.load();
    Json(json!({
        "ok": true,
        "roundSeconds": cfg.round_seconds,
        "closeBetsAt": cfg.close_bets_at,
        "anchorMs": cfg.anchor_ms,
    }))
}

/// `PUT /api/admin/config`
pub async fn put_config(
    State(state): State<AppState>,
    Json(req): Json<UpdateRoundConfigRequest>,
) -> Json<Value> {
    let updated = admin_service::update_round_config(
        &state.settings.round,
        admin_service::RoundConfigUpdate {
            round_seconds: req.round_seconds,
            close_bets_at: req.close_bets_at,
            anchor_ms: req.anchor_ms,
        },
    );

    Json(json!({
        "ok": true,
        "roundSeconds": updated.round_seconds,
        "closeBetsAt": updated.close_bets_at,
        "anchorMs": updated.anchor_ms,
    }))
}

/// `POST /api/admin/gift-codes`
pub async fn generate_gift_codes(
    State(state): State<AppState>,
    Json(req): Json<GenerateGiftCodesRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.count == 0 || req.value <= 0 {
        return Err(ApiError::BadRequest(
            "count must be positive and value must be positive".into(),
        ));
    }

    let seed = state.settings.secret_seed.clone().unwrap_or_default();
    let generated = admin_service::generate_gift_codes(
        &state.pool,
        seed.as_bytes(),
        req.count,
        req.value,
        req.expires_at,
    )
    .await
    .map_err(ApiError::from)?;

    let codes: Vec<Value> = generated
        .into_iter()
        .map(|g| json!({ "code": g.code, "value": g.value }))
        .collect();

    Ok(Json(json!({ "ok": true, "codes": codes })))
}

/// `POST /api/admin/settle`. If `roundId` is omitted, targets
/// `currentRoundId - 1`.
pub async fn settle(
    State(state): State<AppState>,
    Json(req): Json<SettleRequest>,
) -> Result<Json<Value>, ApiError> {
    let round_cfg = state.settings.round.load();
    let now_ms = state.now_ms();

    let target: i64 = match req.round_id {
        Some(id) => id,
        None => {
            let current = round_info(&round_cfg, now_ms).round_id;
            i64::try_from(current).unwrap_or(i64::MAX) - 1
        }
    };
    if target < 0 {
        return Err(ApiError::BadRequest("roundId must be >= 0".into()));
    }
    let round_id = u64::try_from(target).unwrap_or(0);

    let seed = state.settings.secret_seed.clone().unwrap_or_default();
    let result = settlement_service::settle(&state.pool, &round_cfg, now_ms, round_id, seed.as_bytes())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(json!({
        "ok": true,
        "roundId": result.round_id,
        "alreadySettled": result.already_settled,
        "outcome": {
            "main": result.outcome.main,
            "chance": result.outcome.chance,
        },
    })))
}

//! `/api/player/*`: signup, gift-code redemption, ledger history.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::dto::{LedgerQuery, RedeemRequest, SignupRequest};
use crate::error::ApiError;
use crate::ratelimit::RateDecision;
use crate::services::{redeem_service, signup_service};
use crate::state::AppState;
use crate::store::postgres;

/// `POST /api/player/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<Value>, ApiError> {
    let player = signup_service::signup(&state.pool, &req.username, state.settings.signup_bonus_dos)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(json!({
        "ok": true,
        "id": player.id,
        "username": player.username,
        "balance": player.balance,
        "status": player.status,
    })))
}

/// `POST /api/player/redeem`, throttled at 5 attempts per client IP per
/// 60-second window.
pub async fn redeem(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<RedeemRequest>,
) -> Result<Json<Value>, ApiError> {
    let now_ms = state.now_ms();
    match state.rate_limiter.check(addr.ip(), now_ms) {
        RateDecision::Allowed => {}
        RateDecision::Limited { retry_after_secs } => {
            return Err(ApiError::RateLimited { retry_after_secs });
        }
    }

    let seed = state.settings.secret_seed.clone().unwrap_or_default();
    let outcome = redeem_service::redeem(&state.pool, req.player_id, &req.code, seed.as_bytes(), state.clock.now())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(json!({
        "ok": true,
        "value": outcome.value,
        "balance": outcome.balance,
    })))
}

/// `GET /api/player/{id}/ledger?limit=`
pub async fn ledger(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let rows = postgres::list_ledger(&state.pool, id, limit)
        .await
        .map_err(ApiError::from)?;

    let entries: Vec<Value> = rows
        .into_iter()
        .map(|r| {
            json!({
                "id": r.id,
                "kind": r.kind,
                "amount": r.amount,
                "meta": r.meta,
                "createdAt": r.created_at,
            })
        })
        .collect();

    Ok(Json(json!({ "ok": true, "entries": entries })))
}

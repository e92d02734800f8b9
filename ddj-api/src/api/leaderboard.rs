//! `GET /api/leaderboard?limit=`

use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};

use crate::api::dto::LeaderboardQuery;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::postgres;

/// Active players ordered by balance descending.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let rows = postgres::leaderboard(&state.pool, limit)
        .await
        .map_err(ApiError::from)?;

    let players: Vec<Value> = rows
        .into_iter()
        .map(|p| json!({ "id": p.id, "username": p.username, "balance": p.balance }))
        .collect();

    Ok(Json(json!({ "ok": true, "players": players })))
}

//! `GET /api/health` -- liveness plus a database reachability probe.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Liveness check. Always 200; a failed database ping reports
/// `{"status":"degraded","db":"error"}` rather than a 5xx, since the
/// process itself is still alive and able to answer.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    if db_ok {
        Json(json!({ "status": "ok", "db": "ok" }))
    } else {
        Json(json!({ "status": "degraded", "db": "error" }))
    }
}

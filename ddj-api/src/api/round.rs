//! `GET /api/round` -- Round-Time Engine snapshot plus the current timing
//! parameters.

use axum::extract::State;
use axum::Json;
use ddj_core::round::round_info;
use serde_json::{json, Value};

use crate::state::AppState;

/// Current round identity/timing, plus the config that produced it.
pub async fn round(State(state): State<AppState>) -> Json<Value> {
    let cfg = state.settings.round.load();
    let info = round_info(&cfg, state.now_ms());

    Json(json!({
        "ok": true,
        "roundId": info.round_id,
        "startMs": info.start_ms,
        "endMs": info.end_ms,
        "closeAtMs": info.close_at_ms,
        "betsOpen": info.bets_open,
        "secondsLeft": info.seconds_left,
        "secondsToClose": info.seconds_to_close,
        "roundSeconds": cfg.round_seconds,
        "closeBetsAt": cfg.close_bets_at,
        "anchorMs": cfg.anchor_ms,
    }))
}

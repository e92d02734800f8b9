//! Player signup: create a player, optionally crediting a signup bonus.

use ddj_core::player::validate_username;
use serde_json::json;
use sqlx::PgPool;

use crate::error::{AppError, Result};
use crate::store::{ledger_kind, postgres, PlayerRow};

/// Create a new player named `username`, crediting `bonus` DOS minor units
/// if positive.
///
/// # Errors
/// - [`AppError::Domain`] (`InvalidUsername`) if the trimmed username is
///   shorter than [`ddj_core::player::MIN_USERNAME_LEN`].
/// - [`AppError::UsernameTaken`] if the username is already in use.
pub async fn signup(pool: &PgPool, username: &str, bonus: i64) -> Result<PlayerRow> {
    let username = validate_username(username)?;

    let mut tx = pool.begin().await.map_err(AppError::from)?;
    let player = postgres::insert_player(&mut *tx, &username, bonus.max(0)).await?;

    if bonus > 0 {
        postgres::insert_ledger(
            &mut *tx,
            Some(player.id),
            ledger_kind::BONUS_SIGNUP,
            bonus,
            json!({}),
        )
        .await?;
    }

    tx.commit().await.map_err(AppError::from)?;
    Ok(player)
}

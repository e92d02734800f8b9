//! Layered error types for the DDJ service.
//!
//! - [`ddj_core::DomainError`] — business logic errors (invalid input,
//!   bets closed, round not ended, weak seed, ...), defined in `ddj-core`
//!   so it is shared with pure unit tests that never see HTTP.
//! - [`InfraError`] — infrastructure errors (database, configuration).
//! - [`AppError`] — combines domain and infra errors; the `Result` alias
//!   used throughout the service and store layers.
//! - [`ApiError`] — HTTP-mapped errors, implements `IntoResponse`.
//!
//! # Error Philosophy
//!
//! Domain errors are recoverable and safe to show to callers. Infra errors
//! are logged with full detail but the client only sees "internal error".

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ddj_core::DomainError;
use serde_json::json;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// INFRASTRUCTURE ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Infrastructure-level errors from external systems.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InfraError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Player referenced by ID does not exist.
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    /// Gift code referenced does not exist.
    #[error("gift code not found")]
    GiftCodeNotFound,

    /// Round requested for settlement has no bets and no prior history.
    #[error("round not found: {0}")]
    RoundNotFound(u64),
}

// ═══════════════════════════════════════════════════════════════════════════════
// APPLICATION ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Application-level errors combining domain and infrastructure errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    /// Domain logic error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Infrastructure error.
    #[error(transparent)]
    Infra(#[from] InfraError),

    /// Player exists but is not ACTIVE.
    #[error("player is not active")]
    PlayerNotActive,

    /// Player balance is insufficient for the requested debit.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Username already taken at signup.
    #[error("username already taken")]
    UsernameTaken,

    /// Gift code is not in a redeemable state.
    #[error("gift code not active")]
    GiftCodeNotActive,

    /// Gift code has expired.
    #[error("gift code expired")]
    GiftCodeExpired,

    /// Settlement for this round already ran; carries the prior outcome.
    #[error("round already settled")]
    AlreadySettled,
}

/// Type alias for application `Result`s.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::Infra(InfraError::Database(e))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// API ERRORS (HTTP-specific)
// ═══════════════════════════════════════════════════════════════════════════════

/// API-level errors with HTTP status codes, produced at the handler
/// boundary from an [`AppError`] plus any purely-transport concerns (auth,
/// rate limiting) that never reach the service layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Wrapped application error.
    #[error(transparent)]
    App(#[from] AppError),

    /// Rate limit exceeded on an IP-throttled endpoint.
    #[error("rate limited")]
    RateLimited {
        /// Seconds until the client may retry.
        retry_after_secs: u64,
    },

    /// Malformed request body/query parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or incorrect `x-admin-key`.
    #[error("forbidden")]
    Forbidden,
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self::App(AppError::Domain(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, extra_header) = match &self {
            Self::App(AppError::Domain(DomainError::InvalidNums(_) | DomainError::InvalidChance(_) | DomainError::InvalidAmount(_) | DomainError::MalformedCode | DomainError::InvalidUsername(_)))
            | Self::BadRequest(_) => (StatusCode::BAD_REQUEST, None),

            Self::App(AppError::Infra(InfraError::PlayerNotFound(_) | InfraError::GiftCodeNotFound | InfraError::RoundNotFound(_))) => {
                (StatusCode::NOT_FOUND, None)
            }

            Self::App(AppError::PlayerNotActive) => (StatusCode::FORBIDDEN, None),
            Self::Forbidden => (StatusCode::FORBIDDEN, None),

            Self::App(AppError::Domain(DomainError::BettingClosed { .. }))
            | Self::App(AppError::Domain(DomainError::RoundNotEnded { .. }))
            | Self::App(AppError::InsufficientBalance)
            | Self::App(AppError::UsernameTaken)
            | Self::App(AppError::GiftCodeNotActive)
            | Self::App(AppError::GiftCodeExpired)
            | Self::App(AppError::AlreadySettled) => (StatusCode::CONFLICT, None),

            Self::App(AppError::Domain(DomainError::WeakSeed)) => {
                tracing::error!("weak or missing SECRET_SEED");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }

            Self::RateLimited { retry_after_secs } => {
                (StatusCode::TOO_MANY_REQUESTS, Some(*retry_after_secs))
            }

            Self::App(AppError::Infra(InfraError::Database(_) | InfraError::Config(_))) => {
                tracing::error!(error = %self, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let mut body = json!({ "error": self.to_string() });
        attach_conflict_fields(&self, &mut body);

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = extra_header {
            response.headers_mut().insert(
                "Retry-After",
                secs.to_string()
                    .parse()
                    .unwrap_or_else(|_| axum::http::HeaderValue::from_static("0")),
            );
        }
        response
    }
}

/// Attach the extra diagnostic fields the spec calls for on specific
/// conflict responses (`roundId`/`secondsToClose`/`secondsLeft`).
fn attach_conflict_fields(err: &ApiError, body: &mut serde_json::Value) {
    match err {
        ApiError::App(AppError::Domain(DomainError::BettingClosed {
            round_id,
            seconds_to_close,
        })) => {
            body["roundId"] = json!(round_id);
            body["secondsToClose"] = json!(seconds_to_close);
        }
        ApiError::App(AppError::Domain(DomainError::RoundNotEnded {
            round_id,
            seconds_left,
        })) => {
            body["roundId"] = json!(round_id);
            body["secondsLeft"] = json!(seconds_left);
        }
        _ => {}
    }
}

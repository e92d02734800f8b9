//! Domain-level errors: business rule violations that are recoverable and
//! safe to show to a caller. Infrastructure concerns (database, transport)
//! live in `ddj-api::error`, which wraps this type.

use thiserror::Error;

/// Business-logic errors raised by the pure round/draw/settlement/gift-code
/// logic in this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DomainError {
    /// `nums` failed validation (wrong length, duplicate, out of range).
    #[error("invalid numbers: {0}")]
    InvalidNums(String),

    /// `chance` was outside `1..=5`.
    #[error("invalid chance digit: {0}")]
    InvalidChance(i32),

    /// Bet `amount` was not a positive integer.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// Betting window for the targeted round has already closed.
    #[error("bets closed for round {round_id}")]
    BettingClosed {
        /// The round that was targeted.
        round_id: u64,
        /// Seconds remaining until betting would have closed (0 once passed).
        seconds_to_close: u64,
    },

    /// The round has not reached its end time yet, so it cannot be settled.
    #[error("round {round_id} has not ended yet")]
    RoundNotEnded {
        /// The round that was targeted.
        round_id: u64,
        /// Seconds remaining until the round ends.
        seconds_left: u64,
    },

    /// `SECRET_SEED` is missing or shorter than the required 16 bytes.
    #[error("secret seed missing or too short (need >= 16 bytes)")]
    WeakSeed,

    /// A gift code string did not match the surface format (length/alphabet).
    #[error("malformed gift code")]
    MalformedCode,

    /// Username failed validation (too short after trimming).
    #[error("invalid username: {0}")]
    InvalidUsername(String),
}

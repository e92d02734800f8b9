//! Pure domain logic for the DOS Draw Jackpot engine.
//!
//! This crate holds everything that can be computed without a database
//! connection, a clock, or a socket: the round-time arithmetic, the
//! deterministic draw, the settlement math, and the gift-code hashing
//! scheme. Everything here is a pure function of its inputs so it can be
//! unit tested (and property tested) without spinning up infrastructure.
//!
//! # Modules
//!
//! - [`bet`] — bet input validation shared by the HTTP layer and pipeline.
//! - [`player`] — username validation shared by the HTTP layer and signup.
//! - [`round`] — Round-Time Engine: maps wall-clock time to round state.
//! - [`draw`] — Deterministic Draw: `(seed, round_id) -> outcome`.
//! - [`settlement`] — pot split, category allocation, proration.
//! - [`giftcode`] — gift-code surface alphabet and hashing.
//! - [`money`] — minor-unit currency constants.
//! - [`error`] — domain-level error type shared with the service crate.

pub mod bet;
pub mod draw;
pub mod error;
pub mod giftcode;
pub mod money;
pub mod player;
pub mod round;
pub mod settlement;

pub use error::DomainError;

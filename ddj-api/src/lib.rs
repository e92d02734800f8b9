//! HTTP service for the DOS Draw Jackpot lottery/betting engine.
//!
//! This crate wires `ddj-core`'s pure domain logic to `PostgreSQL`
//! (`sqlx`) and HTTP (`axum`): configuration, logging, the in-memory
//! redemption rate limiter, the transactional bet/settlement/redemption
//! pipelines, and the route table that drives them.
//!
//! # Modules
//!
//! - [`config`] -- settings loading and the atomically-swapped round
//!   timing snapshot.
//! - [`error`] -- the layered `InfraError`/`AppError`/`ApiError` types.
//! - [`ports`] -- the `Clock` seam (`SystemClock` in production,
//!   `FakeClock` in tests).
//! - [`ratelimit`] -- the per-IP gift-code redemption limiter.
//! - [`state`] -- `AppState`, the `Clone`-able bundle handed to handlers.
//! - [`store`] -- `SQLx`/`PostgreSQL` query functions and row types.
//! - [`services`] -- the signup/bet/settlement/redeem/admin pipelines.
//! - [`api`] -- the `axum` router and per-endpoint handlers.

pub mod api;
pub mod config;
pub mod error;
pub mod ports;
pub mod ratelimit;
pub mod services;
pub mod state;
pub mod store;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

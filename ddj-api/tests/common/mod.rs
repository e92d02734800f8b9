//! Common test infrastructure.
//!
//! - Container setup for `PostgreSQL`
//! - A `TestDb` fixture that runs migrations once per test

pub mod fixtures;

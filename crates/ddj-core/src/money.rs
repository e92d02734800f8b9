//! Minor-unit currency constants.
//!
//! Every monetary column and every arithmetic path in this codebase works
//! in DOS minor units — integers, never floats. `DOS_UNIT` is the scale
//! factor between a whole DOS and a minor unit, kept here so the HTTP and
//! admin-tooling layers share one constant instead of each hard-coding it.

/// Minor units per whole DOS (1 DOS = 10 minor units).
pub const DOS_UNIT: i64 = 10;

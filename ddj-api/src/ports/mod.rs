//! Narrow seams between the service layer and the outside world.
//!
//! Keeping these as traits (rather than reaching for `Utc::now()` or a
//! global RNG directly from service code) is what lets the settlement and
//! bet pipelines be driven by fixed, fast integration tests instead of
//! real wall-clock sleeps.

pub mod clock;

pub use clock::{Clock, SystemClock};

//! Configuration loading and validation.
//!
//! Settings load from defaults, then an optional TOML file, then
//! environment variables (highest precedence) -- matching the teacher's
//! layered `config` crate setup. Most environment variables in this
//! service are the bare names `spec.md` §6 lists (`PORT`, `ADMIN_KEY`,
//! ...) rather than a namespaced prefix, since those names are part of
//! the deployment contract.

mod settings;

pub use settings::{RoundConfigSnapshot, Settings};

//! Settings struct and loading logic.
//!
//! Precedence, highest first: environment variables -> optional
//! `config/default.toml` -> built-in defaults. Callers run
//! [`dotenvy::dotenv`] before [`Settings::load`] so a local `.env` file
//! populates the environment the same way a deployed environment would.

use std::sync::Arc;

use arc_swap::ArcSwap;
use config::{Config, ConfigError, File};
use ddj_core::round::RoundConfig;

/// Default round length: five minutes.
const DEFAULT_ROUND_SECONDS: u64 = 300;
/// Default betting cutoff: thirty seconds before round end.
const DEFAULT_CLOSE_BETS_AT: u64 = 30;
/// Default anchor: 2024-01-01T00:00:00Z, in Unix epoch milliseconds.
const DEFAULT_ANCHOR_MS: i64 = 1_704_067_200_000;
/// Default signup bonus, in DOS minor units.
const DEFAULT_SIGNUP_BONUS_DOS: i64 = 50;
/// Default HTTP port.
const DEFAULT_PORT: u16 = 3000;

/// Process-wide immutable settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// HTTP listen port.
    pub port: u16,
    /// Shared secret required in `x-admin-key` for admin endpoints. `None`
    /// means admin endpoints are unreachable (fail closed).
    pub admin_key: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Seed for the deterministic draw and gift-code hashing. Must be
    /// checked against [`ddj_core::draw::MIN_SEED_LEN`] at the call sites
    /// that need it (settlement, redemption) -- a missing/short seed is a
    /// `ConfigError` only when those operations are actually invoked.
    pub secret_seed: Option<String>,
    /// Signup bonus credited to new players, in DOS minor units.
    pub signup_bonus_dos: i64,
    /// Mutable round timing parameters, behind a snapshot so concurrent
    /// readers never observe a torn combination of fields.
    pub round: RoundConfigSnapshot,
}

impl Settings {
    /// Load settings from `config/default.toml` (if present) and the
    /// environment, applying the bare-name environment variables
    /// `spec.md` §6 specifies.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the optional TOML file exists but fails
    /// to parse, or if `DATABASE_URL` is missing.
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into());
        let file_cfg = Config::builder()
            .add_source(File::with_name(&format!("{config_dir}/default")).required(false))
            .build()?;

        let string_of = |env: &str, key: &str| -> Option<String> {
            std::env::var(env)
                .ok()
                .filter(|v| !v.is_empty())
                .or_else(|| file_cfg.get_string(key).ok())
        };
        let int_of = |env: &str, key: &str, default: i64| -> i64 {
            string_of(env, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };

        let database_url = string_of("DATABASE_URL", "database_url").ok_or_else(|| {
            ConfigError::NotFound("DATABASE_URL is required".into())
        })?;

        let round = RoundConfig {
            round_seconds: u64::try_from(int_of(
                "ROUND_SECONDS",
                "round.round_seconds",
                i64::try_from(DEFAULT_ROUND_SECONDS).unwrap_or(300),
            ))
            .unwrap_or(DEFAULT_ROUND_SECONDS),
            close_bets_at: u64::try_from(int_of(
                "CLOSE_BETS_AT",
                "round.close_bets_at",
                i64::try_from(DEFAULT_CLOSE_BETS_AT).unwrap_or(30),
            ))
            .unwrap_or(DEFAULT_CLOSE_BETS_AT),
            anchor_ms: int_of("ANCHOR_MS", "round.anchor_ms", DEFAULT_ANCHOR_MS),
        }
        .clamp();

        Ok(Self {
            port: u16::try_from(int_of("PORT", "port", i64::from(DEFAULT_PORT)))
                .unwrap_or(DEFAULT_PORT),
            admin_key: string_of("ADMIN_KEY", "admin_key"),
            database_url,
            secret_seed: string_of("SECRET_SEED", "secret_seed"),
            signup_bonus_dos: int_of("SIGNUP_BONUS_DOS", "signup_bonus_dos", DEFAULT_SIGNUP_BONUS_DOS),
            round: RoundConfigSnapshot::new(round),
        })
    }

    /// Whether SSL should be disabled for the configured database host.
    /// Only localhost/127.0.0.1 are allowed to skip TLS.
    #[must_use]
    pub fn database_ssl_required(&self) -> bool {
        !(self.database_url.contains("localhost") || self.database_url.contains("127.0.0.1"))
    }
}

/// Atomically-swapped holder for the mutable round timing parameters.
///
/// Every handler reads one snapshot per request via [`RoundConfigSnapshot::load`]
/// rather than reading individual fields, so a concurrent admin config
/// update can never be observed half-applied.
#[derive(Debug, Clone)]
pub struct RoundConfigSnapshot(Arc<ArcSwap<RoundConfig>>);

impl RoundConfigSnapshot {
    /// Create a snapshot holder seeded with `initial`.
    #[must_use]
    pub fn new(initial: RoundConfig) -> Self {
        Self(Arc::new(ArcSwap::from_pointee(initial)))
    }

    /// Read the current configuration.
    #[must_use]
    pub fn load(&self) -> RoundConfig {
        **self.0.load()
    }

    /// Atomically replace the configuration.
    pub fn store(&self, new: RoundConfig) {
        self.0.store(Arc::new(new));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_readers_see_full_update() {
        let snap = RoundConfigSnapshot::new(RoundConfig {
            round_seconds: 300,
            close_bets_at: 30,
            anchor_ms: 0,
        });
        snap.store(RoundConfig {
            round_seconds: 60,
            close_bets_at: 10,
            anchor_ms: 5,
        });
        let read = snap.load();
        assert_eq!(read.round_seconds, 60);
        assert_eq!(read.close_bets_at, 10);
        assert_eq!(read.anchor_ms, 5);
    }
}

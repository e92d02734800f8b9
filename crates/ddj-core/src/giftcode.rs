//! Gift-code surface format, generation, and hashing.
//!
//! Codes are shown once at generation time; only `code_hash` is stored.
//! The alphabet deliberately excludes glyphs that are easy to confuse when
//! read aloud or transcribed: `O`, `0`, `I`, `1`.

use sha2::{Digest, Sha256};

use crate::error::DomainError;

/// Alphabet codes are drawn from (32 symbols, no ambiguous glyphs).
pub const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Fixed surface length of a gift code.
pub const CODE_LEN: usize = 12;

/// Generate one gift code using `rng`.
pub fn generate(rng: &mut impl rand::Rng) -> String {
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}

/// Validate a code's surface format: fixed length, uppercase, alphabet-only.
///
/// # Errors
/// Returns [`DomainError::MalformedCode`] if the code fails validation.
pub fn validate_format(code: &str) -> Result<(), DomainError> {
    if code.len() != CODE_LEN || !code.bytes().all(|b| ALPHABET.contains(&b)) {
        return Err(DomainError::MalformedCode);
    }
    Ok(())
}

/// Compute the stored hash for a plaintext code under `seed`.
///
/// `seed` is `SECRET_SEED`; callers must check it is at least
/// [`crate::draw::MIN_SEED_LEN`] bytes before calling this (the spec treats
/// a short seed as a `ConfigError`, not a hashing concern).
#[must_use]
pub fn code_hash(seed: &[u8], code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"DDJ|");
    hasher.update(seed);
    hasher.update(b"|");
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn generated_codes_match_surface_format() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let code = generate(&mut rng);
            assert!(validate_format(&code).is_ok());
        }
    }

    #[test]
    fn rejects_ambiguous_glyphs() {
        assert!(validate_format("ABCDEFGH0JKL").is_err()); // contains '0'
        assert!(validate_format("ABCDEFGHIJKL").is_err()); // contains 'I'
        assert!(validate_format("short").is_err());
    }

    #[test]
    fn hash_is_deterministic_and_seed_sensitive() {
        let seed_a = b"0123456789abcdef";
        let seed_b = b"fedcba9876543210";
        let code = "ABCDEFGHJKMN";
        assert_eq!(code_hash(seed_a, code), code_hash(seed_a, code));
        assert_ne!(code_hash(seed_a, code), code_hash(seed_b, code));
    }
}

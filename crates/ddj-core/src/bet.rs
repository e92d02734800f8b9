//! Bet input validation shared between the HTTP layer and the bet pipeline.
//!
//! Validation here is purely shape/range checking — it has no knowledge of
//! balances, rounds, or the database. [`validate`] fails fast, before any
//! transaction is opened, exactly as the spec's Bet Pipeline requires.

use crate::error::DomainError;

/// Numbers accepted per bet.
pub const MIN_NUMS: usize = 4;
/// Maximum numbers accepted per bet.
pub const MAX_NUMS: usize = 8;
/// Upper bound (inclusive) of the number pool.
pub const MAX_NUM_VALUE: u8 = 20;
/// Upper bound (inclusive) of the chance digit.
pub const MAX_CHANCE: u8 = 5;

/// A bet input that has passed shape/range validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBet {
    /// Deduplicated, ascending-sorted numbers.
    pub nums: Vec<u8>,
    /// Chance digit, `1..=5`.
    pub chance: u8,
    /// Stake, in DOS minor units.
    pub amount: i64,
}

/// Validate and normalize a raw bet submission.
///
/// # Errors
/// - [`DomainError::InvalidAmount`] if `amount` is not a positive integer.
/// - [`DomainError::InvalidNums`] if, after dedup+sort, `nums` is not
///   `4..=8` entries each in `1..=20`.
/// - [`DomainError::InvalidChance`] if `chance` is outside `1..=5`.
pub fn validate(nums: &[i64], chance: i64, amount: i64) -> Result<ValidBet, DomainError> {
    if amount <= 0 {
        return Err(DomainError::InvalidAmount(amount));
    }

    let mut normalized: Vec<u8> = Vec::with_capacity(nums.len());
    for &n in nums {
        let n = u8::try_from(n).map_err(|_| DomainError::InvalidNums(format!("out of range: {n}")))?;
        if n < 1 || n > MAX_NUM_VALUE {
            return Err(DomainError::InvalidNums(format!("out of range: {n}")));
        }
        if !normalized.contains(&n) {
            normalized.push(n);
        }
    }
    normalized.sort_unstable();

    if normalized.len() < MIN_NUMS || normalized.len() > MAX_NUMS {
        return Err(DomainError::InvalidNums(format!(
            "length {} not in {}..={}",
            normalized.len(),
            MIN_NUMS,
            MAX_NUMS
        )));
    }

    let chance = u8::try_from(chance).map_err(|_| DomainError::InvalidChance(chance as i32))?;
    if chance < 1 || chance > MAX_CHANCE {
        return Err(DomainError::InvalidChance(i32::from(chance)));
    }

    Ok(ValidBet {
        nums: normalized,
        chance,
        amount,
    })
}

/// Render a bet's numbers/chance as the ledger `choice` display key:
/// `"n1-n2-...#chance"`.
#[must_use]
pub fn choice_key(nums: &[u8], chance: u8) -> String {
    let nums_part = nums
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join("-");
    format!("{nums_part}#{chance}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimum_and_maximum_lengths() {
        assert!(validate(&[1, 2, 3, 4], 1, 10).is_ok());
        assert!(validate(&[1, 2, 3, 4, 5, 6, 7, 8], 1, 10).is_ok());
    }

    #[test]
    fn rejects_too_few_or_too_many() {
        assert!(validate(&[1, 2, 3], 1, 10).is_err());
        assert!(validate(&[1, 2, 3, 4, 5, 6, 7, 8, 9], 1, 10).is_err());
    }

    #[test]
    fn dedups_before_length_check() {
        // Six entries with one duplicate -> 5 unique, still valid.
        let bet = validate(&[1, 2, 3, 4, 5, 5], 1, 10).unwrap();
        assert_eq!(bet.nums, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn rejects_zero_amount() {
        assert!(validate(&[1, 2, 3, 4], 1, 0).is_err());
    }

    #[test]
    fn rejects_out_of_range_chance() {
        assert!(validate(&[1, 2, 3, 4], 6, 10).is_err());
        assert!(validate(&[1, 2, 3, 4], 0, 10).is_err());
    }

    #[test]
    fn choice_key_format() {
        assert_eq!(choice_key(&[3, 7, 11, 19], 2), "3-7-11-19#2");
    }
}

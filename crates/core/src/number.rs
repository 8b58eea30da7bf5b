//! Account number generation.
//!
//! Format: 4-digit routing prefix + 12 decimal digits drawn from the OS
//! random source, 16 characters in total.

use crate::error::LedgerError;
use rand::rngs::OsRng;
use rand::RngCore;

pub const ACCOUNT_NUMBER_LEN: usize = 16;
pub const ROUTING_PREFIX_LEN: usize = 4;
pub const DEFAULT_ROUTING_PREFIX: &str = "4000";

const RANDOM_DIGITS: usize = ACCOUNT_NUMBER_LEN - ROUTING_PREFIX_LEN;

/// Largest byte value that maps onto 0..=9 without modulo bias
const UNBIASED_BYTE_CEILING: u8 = 250;

/// Generates an account number from the OS random source
pub fn generate_account_number(prefix: &str) -> Result<String, LedgerError> {
    generate_with_rng(prefix, &mut OsRng)
}

/// Generates an account number from the given source of randomness.
///
/// Fails with `InvalidInput` if the prefix is malformed or the RNG fails.
pub fn generate_with_rng<R: RngCore + ?Sized>(
    prefix: &str,
    rng: &mut R,
) -> Result<String, LedgerError> {
    validate_prefix(prefix)?;

    let mut number = String::with_capacity(ACCOUNT_NUMBER_LEN);
    number.push_str(prefix);

    let mut buf = [0u8; RANDOM_DIGITS * 2];
    while number.len() < ACCOUNT_NUMBER_LEN {
        rng.try_fill_bytes(&mut buf).map_err(|e| {
            LedgerError::InvalidInput(format!("failed to generate account number: {e}"))
        })?;
        for byte in buf {
            if number.len() == ACCOUNT_NUMBER_LEN {
                break;
            }
            if byte < UNBIASED_BYTE_CEILING {
                number.push(char::from(b'0' + byte % 10));
            }
        }
    }

    Ok(number)
}

pub fn validate_prefix(prefix: &str) -> Result<(), LedgerError> {
    if prefix.len() != ROUTING_PREFIX_LEN || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::InvalidInput(format!(
            "routing prefix must be {ROUTING_PREFIX_LEN} digits: {prefix:?}"
        )));
    }
    Ok(())
}

/// Checks the shape of an account number (not its existence)
pub fn is_valid_account_number(number: &str) -> bool {
    number.len() == ACCOUNT_NUMBER_LEN && number.bytes().all(|b| b.is_ascii_digit())
}

// File:    key_generator.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Generates one-time pad keys drawn uniformly from the printable ASCII alphabet.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use crate::error::KeyGenError;
use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// The lowest code point a key symbol can take (space).
pub const FIRST_SYMBOL: u8 = 32;
/// The highest code point a key symbol can take (`~`).
pub const LAST_SYMBOL: u8 = 126;
/// The number of distinct key symbols.
pub const ALPHABET_SIZE: u8 = LAST_SYMBOL - FIRST_SYMBOL + 1;

// Largest multiple of the alphabet size that fits in a byte. Bytes at or above
// it are rejected so every symbol keeps the same probability.
const ACCEPT_BELOW: u8 = ALPHABET_SIZE * 2;

/// Generates a key of exactly `length` printable ASCII symbols.
///
/// Every symbol is drawn independently and uniformly from the code points
/// 32 through 126 using the operating system's cryptographically secure
/// random number generator. A length of zero yields an empty key.
///
/// # Arguments
///
/// * `length` - The number of symbols the key must contain.
///
/// # Errors
///
/// Returns [`KeyGenError::Entropy`] if the operating system random source fails.
pub fn generate(length: usize) -> Result<String, KeyGenError> {
    let mut rng = OsRng;
    let mut key = String::with_capacity(length);
    let mut buffer = vec![0u8; length.clamp(1, 4096)];

    while key.len() < length {
        rng.try_fill_bytes(&mut buffer)
            .map_err(|e| KeyGenError::Entropy(e.to_string()))?;

        let missing = length - key.len();
        key.extend(
            buffer
                .iter()
                .filter(|&&byte| byte < ACCEPT_BELOW)
                .take(missing)
                .map(|&byte| char::from(FIRST_SYMBOL + byte % ALPHABET_SIZE)),
        );
    }

    Ok(key)
}

/// Returns the lowercase hex SHA-256 digest of a key.
///
/// The fingerprint identifies a key in logs without revealing its contents.
#[must_use]
pub fn fingerprint(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}

/// Checks whether a character belongs to the key alphabet.
#[must_use]
pub const fn is_key_symbol(symbol: char) -> bool {
    matches!(symbol, ' '..='~')
}

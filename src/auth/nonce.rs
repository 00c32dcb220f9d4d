//! Anti-replay challenge generation
//!
//! Challenges protect a sign-in request against replay: the hashed form goes
//! out with the request, the raw form is retained to validate the matching
//! callback.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Characters a challenge may contain: digits, letters minus the easily
/// confused ones, and `-._`.
const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVXYZabcdefghijklmnopqrstuvwxyz-._";

/// A single-use sign-in challenge.
#[derive(Debug, Clone)]
pub struct Nonce {
    raw: String,
    hashed: String,
}

impl Nonce {
    /// The raw challenge, retained locally to validate the provider callback.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Hex-encoded SHA-256 digest of the raw challenge, sent with the
    /// outgoing request as the anti-replay value.
    pub fn hashed(&self) -> &str {
        &self.hashed
    }
}

/// Generate a random challenge of exactly `length` characters.
///
/// Bytes come from the OS secure random source; bytes outside the charset
/// are discarded and redrawn, so every character is uniformly distributed.
///
/// # Panics
/// Panics if `length` is zero or if the secure random source fails. Neither
/// is recoverable: the first is a caller bug, the second means no
/// cryptographically secure randomness is available.
pub fn generate(length: usize) -> Nonce {
    assert!(length > 0, "challenge length must be positive");

    let mut raw = String::with_capacity(length);
    let mut randoms = [0u8; 16];

    while raw.len() < length {
        if let Err(e) = OsRng.try_fill_bytes(&mut randoms) {
            panic!("unable to generate challenge: secure random source failed: {e}");
        }

        for &byte in &randoms {
            if raw.len() == length {
                break;
            }
            if (byte as usize) < CHARSET.len() {
                raw.push(CHARSET[byte as usize] as char);
            }
        }
    }

    let hashed = hex::encode(Sha256::digest(raw.as_bytes()));

    Nonce { raw, hashed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_exact_length() {
        for length in [1, 8, 16, 32, 64, 129] {
            let nonce = generate(length);
            assert_eq!(nonce.raw().len(), length);
        }
    }

    #[test]
    fn test_generate_draws_from_charset() {
        let nonce = generate(256);
        for c in nonce.raw().bytes() {
            assert!(
                CHARSET.contains(&c),
                "unexpected challenge character: {}",
                c as char
            );
        }
    }

    #[test]
    fn test_hashed_is_hex_sha256_of_raw() {
        let nonce = generate(32);
        let expected = hex::encode(Sha256::digest(nonce.raw().as_bytes()));

        assert_eq!(nonce.hashed(), expected);
        assert_eq!(nonce.hashed().len(), 64);
        assert!(nonce.hashed().bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_no_collisions_over_many_samples() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let nonce = generate(32);
            assert!(seen.insert(nonce.raw().to_owned()), "challenge collision");
        }
    }

    #[test]
    #[should_panic(expected = "challenge length must be positive")]
    fn test_zero_length_panics() {
        generate(0);
    }
}

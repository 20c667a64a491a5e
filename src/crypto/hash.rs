//! Cryptographic hashing utilities for the ledger
//!
//! Provides the SHA-256 digest used for block hashes and transaction
//! signing payloads, plus the hex-digit difficulty check used by the
//! proof-of-work search.

use sha2::{Digest as _, Sha256};

/// A 256-bit SHA-256 digest
pub type Digest = [u8; 32];

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes SHA-256 hash and returns it as a lowercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Checks if a digest meets the difficulty target.
///
/// The lowercase hex rendering of `hash` must start with `difficulty`
/// zero digits. Each byte holds two hex digits, so the check walks
/// nibbles instead of formatting the whole digest.
pub fn meets_difficulty(hash: &[u8], difficulty: usize) -> bool {
    if difficulty > hash.len() * 2 {
        return false;
    }

    (0..difficulty).all(|i| {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        nibble == 0
    })
}

/// Serde adapter that writes a [`Digest`] as a lowercase hex string
pub mod hex_digest {
    use super::Digest;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(digest: &Digest, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(digest))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Digest, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let mut digest = [0u8; 32];
        hex::decode_to_slice(&text, &mut digest).map_err(D::Error::custom)?;
        Ok(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            sha256_hex(data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_meets_difficulty() {
        // hex: 000fff...
        let hash = [0x00, 0x0F, 0xFF, 0xFF];
        assert!(meets_difficulty(&hash, 0));
        assert!(meets_difficulty(&hash, 2));
        assert!(meets_difficulty(&hash, 3));
        assert!(!meets_difficulty(&hash, 4));
    }

    #[test]
    fn test_meets_difficulty_matches_hex_prefix() {
        let hash = sha256(b"nonce-search");
        let rendered = hex::encode(hash);
        for difficulty in 0..6 {
            let expected = rendered.starts_with(&"0".repeat(difficulty));
            assert_eq!(meets_difficulty(&hash, difficulty), expected);
        }
    }

    #[test]
    fn test_difficulty_beyond_digest_length() {
        assert!(!meets_difficulty(&[0u8; 32], 65));
        assert!(meets_difficulty(&[0u8; 32], 64));
    }
}

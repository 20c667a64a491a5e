//! Cryptographic utilities for the ledger
//!
//! This module provides:
//! - SHA-256 hashing and the hex-digit difficulty check
//! - ECDSA key management (secp256k1)

pub mod hash;
pub mod keys;

pub use hash::{hex_digest, meets_difficulty, sha256, sha256_hex, Digest};
pub use keys::{
    public_key_from_hex, public_key_to_address, public_key_to_hex, sign_message,
    signature_from_hex, signature_to_hex, verify_signature, KeyError, KeyPair,
};

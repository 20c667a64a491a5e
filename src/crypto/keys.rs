//! ECDSA key management for the ledger
//!
//! Key pair generation, signing, and verification using the secp256k1
//! curve. Public keys travel as the hex concatenation of the two curve
//! point coordinates (X‖Y, 128 hex chars) and signatures as the hex
//! concatenation of R‖S (128 hex chars).

use rand::rngs::OsRng;
use ripemd::Ripemd160;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::hash::sha256;

/// Tag byte of an uncompressed SEC1 point
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as X‖Y coordinate hex
    pub fn public_key_hex(&self) -> String {
        public_key_to_hex(&self.public_key)
    }

    /// Generate a ledger address from the public key
    /// Uses Bitcoin-style address generation: Base58Check(RIPEMD160(SHA256(pubkey)))
    pub fn address(&self) -> String {
        public_key_to_address(&self.public_key)
    }

    /// Sign a 32-byte message hash with the private key
    pub fn sign(&self, message_hash: &[u8]) -> Result<Signature, KeyError> {
        sign_message(&self.secret_key, message_hash)
    }
}

/// Convert a public key to a ledger address
pub fn public_key_to_address(public_key: &PublicKey) -> String {
    let sha256_hash = sha256(&public_key.serialize());

    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256_hash);
    let ripemd_hash = ripemd.finalize();

    // Version byte 0x00
    let mut address_bytes = vec![0x00];
    address_bytes.extend_from_slice(&ripemd_hash);

    // First 4 bytes of double SHA256
    let checksum = {
        let first_hash = Sha256::digest(&address_bytes);
        Sha256::digest(first_hash)
    };
    address_bytes.extend_from_slice(&checksum[..4]);

    bs58::encode(address_bytes).into_string()
}

/// Encode a public key as the hex of its X‖Y coordinates
pub fn public_key_to_hex(public_key: &PublicKey) -> String {
    hex::encode(&public_key.serialize_uncompressed()[1..])
}

/// Parse a public key from X‖Y coordinate hex
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    let coordinates = hex::decode(hex_key).map_err(|_| KeyError::InvalidPublicKey)?;
    if coordinates.len() != 64 {
        return Err(KeyError::InvalidPublicKey);
    }

    let mut point = Vec::with_capacity(65);
    point.push(UNCOMPRESSED_TAG);
    point.extend_from_slice(&coordinates);
    PublicKey::from_slice(&point).map_err(|_| KeyError::InvalidPublicKey)
}

/// Encode a signature as the hex of R‖S
pub fn signature_to_hex(signature: &Signature) -> String {
    hex::encode(signature.serialize_compact())
}

/// Parse a signature from R‖S hex
pub fn signature_from_hex(hex_sig: &str) -> Result<Signature, KeyError> {
    let bytes = hex::decode(hex_sig).map_err(|_| KeyError::InvalidSignature)?;
    Signature::from_compact(&bytes).map_err(|_| KeyError::InvalidSignature)
}

/// Sign a message hash with a secret key
pub fn sign_message(secret_key: &SecretKey, message_hash: &[u8]) -> Result<Signature, KeyError> {
    let secp = Secp256k1::signing_only();
    let message = Message::from_digest_slice(message_hash)?;
    Ok(secp.sign_ecdsa(&message, secret_key))
}

/// Verify a signature over a 32-byte message hash.
///
/// High-S signatures are normalized first; any malformed input reports
/// `false` rather than an error.
pub fn verify_signature(public_key: &PublicKey, message_hash: &[u8], signature: &Signature) -> bool {
    let secp = Secp256k1::verification_only();
    let Ok(message) = Message::from_digest_slice(message_hash) else {
        return false;
    };

    let mut signature = *signature;
    signature.normalize_s();
    secp.verify_ecdsa(&message, &signature, public_key).is_ok()
}

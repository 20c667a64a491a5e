//! Transaction implementation
//!
//! A transaction is a plain value transfer between two addresses. Only
//! the three public fields take part in its canonical serialization, so
//! the JSON form doubles as the signed payload.

use crate::crypto::{public_key_from_hex, sha256, signature_from_hex, Digest, KeyError};
use secp256k1::ecdsa::Signature;
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque ledger address
pub type Address = String;

/// Transfer amount (32-bit float precision)
pub type Amount = f32;

/// A value-transfer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    sender_blockchain_address: Address,
    recipient_blockchain_address: Address,
    value: Amount,
}

impl Transaction {
    pub fn new(sender: &str, recipient: &str, value: Amount) -> Self {
        Self {
            sender_blockchain_address: sender.to_string(),
            recipient_blockchain_address: recipient.to_string(),
            value,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender_blockchain_address
    }

    pub fn recipient(&self) -> &str {
        &self.recipient_blockchain_address
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    /// Canonical JSON bytes of the signed fields
    pub fn canonical_json(&self) -> Vec<u8> {
        // Strings and floats always serialize (non-finite floats become null)
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// SHA-256 of the canonical JSON; this is the message that gets signed
    pub fn hash(&self) -> Digest {
        sha256(&self.canonical_json())
    }
}

/// Errors raised while turning a submission into ledger inputs
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("missing field(s)")]
    MissingFields,
    #[error("sender is reserved for mining rewards")]
    ReservedSender,
    #[error("value must be a finite, non-negative amount (got {0})")]
    InvalidValue(Amount),
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}

/// Transaction submission as received from a client or relayed by a peer.
/// Every field is optional so that absence can be detected after decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub sender_blockchain_address: Option<String>,
    pub recipient_blockchain_address: Option<String>,
    pub sender_public_key: Option<String>,
    pub value: Option<Amount>,
    pub signature: Option<String>,
}

/// A fully decoded submission, ready for admission
#[derive(Debug, Clone)]
pub struct SignedSubmission {
    pub sender: Address,
    pub recipient: Address,
    pub value: Amount,
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl TransactionRequest {
    /// True when every field is present
    pub fn validate(&self) -> bool {
        self.sender_blockchain_address.is_some()
            && self.recipient_blockchain_address.is_some()
            && self.sender_public_key.is_some()
            && self.value.is_some()
            && self.signature.is_some()
    }

    /// Decode the key and signature text and range-check the value.
    /// Anything undecodable fails closed.
    pub fn parse(&self) -> Result<SignedSubmission, RequestError> {
        let (Some(sender), Some(recipient), Some(public_key), Some(value), Some(signature)) = (
            &self.sender_blockchain_address,
            &self.recipient_blockchain_address,
            &self.sender_public_key,
            self.value,
            &self.signature,
        ) else {
            return Err(RequestError::MissingFields);
        };

        // Non-finite values serialize as null and break the chain format
        if !value.is_finite() || value < 0.0 {
            return Err(RequestError::InvalidValue(value));
        }

        Ok(SignedSubmission {
            sender: sender.clone(),
            recipient: recipient.clone(),
            value,
            public_key: public_key_from_hex(public_key)?,
            signature: signature_from_hex(signature)?,
        })
    }
}

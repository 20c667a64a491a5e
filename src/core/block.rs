//! Block implementation for the ledger
//!
//! A block is a timestamped, hash-linked batch of transactions together
//! with the nonce that was found for it.

use crate::core::transaction::Transaction;
use crate::crypto::{hex_digest, sha256, Digest};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A block in the chain.
///
/// Field order is the canonical serialization order used for hashing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Creation time in nanoseconds since the Unix epoch
    timestamp: i64,
    /// Nonce found by the proof-of-work search
    nonce: u64,
    /// Hash of the previous block
    #[serde(with = "hex_digest")]
    previous_hash: Digest,
    /// Sealed transactions, in insertion order
    transactions: Vec<Transaction>,
}

impl Block {
    /// Create a block stamped with the current wall-clock time
    pub fn new(nonce: u64, previous_hash: Digest, transactions: Vec<Transaction>) -> Self {
        Self {
            timestamp: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            nonce,
            previous_hash,
            transactions,
        }
    }

    /// Proof-of-work candidate: same contents, timestamp pinned to zero
    pub fn candidate(nonce: u64, previous_hash: Digest, transactions: Vec<Transaction>) -> Self {
        Self {
            timestamp: 0,
            nonce,
            previous_hash,
            transactions,
        }
    }

    /// SHA-256 over the canonical JSON form
    pub fn hash(&self) -> Digest {
        // Integers, hex strings and transactions always serialize
        sha256(&serde_json::to_vec(self).unwrap_or_default())
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn previous_hash(&self) -> &Digest {
        &self.previous_hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Step a proof-of-work candidate to the next nonce
    pub(crate) fn advance_nonce(&mut self) -> Option<u64> {
        self.nonce = self.nonce.checked_add(1)?;
        Some(self.nonce)
    }

    /// Get number of transactions in this block
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }
}

//! Wallet implementation
//!
//! Holds a key pair, derives the ledger address, and produces signed
//! transaction submissions.

use crate::core::{Amount, Transaction, TransactionRequest};
use crate::crypto::{signature_to_hex, KeyError, KeyPair};
use thiserror::Error;

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
}

/// A ledger wallet for managing keys and signing transfers
pub struct Wallet {
    key_pair: KeyPair,
}

impl Wallet {
    /// Create a new wallet with a fresh key pair
    pub fn new() -> Self {
        Self {
            key_pair: KeyPair::generate(),
        }
    }

    /// Import a wallet from a private key
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, WalletError> {
        let key_pair = KeyPair::from_private_key_hex(private_key_hex)?;
        Ok(Self { key_pair })
    }

    /// Get the wallet's address
    pub fn address(&self) -> String {
        self.key_pair.address()
    }

    /// Get the wallet's public key (X‖Y hex)
    pub fn public_key(&self) -> String {
        self.key_pair.public_key_hex()
    }

    /// Get the wallet's private key (hex)
    /// WARNING: Keep this secret!
    pub fn private_key(&self) -> String {
        self.key_pair.private_key_hex()
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Sign a transfer from this wallet's address and package it as a
    /// submission request
    pub fn sign_transaction(
        &self,
        recipient: &str,
        value: Amount,
    ) -> Result<TransactionRequest, WalletError> {
        let sender = self.address();
        let tx = Transaction::new(&sender, recipient, value);
        let signature = self.key_pair.sign(&tx.hash())?;

        Ok(TransactionRequest {
            sender_blockchain_address: Some(sender),
            recipient_blockchain_address: Some(recipient.to_string()),
            sender_public_key: Some(self.public_key()),
            value: Some(value),
            signature: Some(signature_to_hex(&signature)),
        })
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Blockchain;

    #[test]
    fn test_wallet_creation() {
        let wallet = Wallet::new();
        assert!(!wallet.address().is_empty());
        assert_eq!(wallet.public_key().len(), 128);
    }

    #[test]
    fn test_wallet_import() {
        let wallet = Wallet::new();
        let imported = Wallet::from_private_key(&wallet.private_key()).unwrap();
        assert_eq!(wallet.address(), imported.address());
        assert!(Wallet::from_private_key("nope").is_err());
    }

    #[test]
    fn test_signed_request_is_admitted() {
        let wallet = Wallet::new();
        let ledger = Blockchain::new("owner");

        let request = wallet.sign_transaction("recipient", 0.75).unwrap();
        let submission = request.parse().unwrap();

        assert!(ledger.add_transaction(
            &submission.sender,
            &submission.recipient,
            submission.value,
            Some(&submission.public_key),
            Some(&submission.signature),
        ));
        assert_eq!(ledger.copy_pool()[0].sender(), wallet.address());
    }
}

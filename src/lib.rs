//! pow-ledger: a single-node proof-of-work ledger
//!
//! This crate provides:
//! - An append-only, hash-linked chain of blocks
//! - ECDSA-signed value transfers (secp256k1) admitted into a pool
//! - Proof-of-work sealing with a cancellable nonce search
//! - A neighbor registry with fire-and-forget pool-clear fan-out
//! - An HTTP transport and a small wallet utility
//!
//! # Example
//!
//! ```rust
//! use pow_ledger::core::{Blockchain, MINING_SENDER};
//!
//! let blockchain = Blockchain::with_difficulty("owner", 1);
//! blockchain.add_transaction(MINING_SENDER, "alice", 1.0, None, None);
//!
//! assert!(blockchain.mine());
//! assert_eq!(blockchain.total_balance("alice"), 1.0);
//! assert_eq!(blockchain.total_balance("owner"), 1.0);
//! ```

pub mod api;
pub mod config;
pub mod core;
pub mod crypto;
pub mod mining;
pub mod network;
pub mod wallet;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use config::NodeConfig;
pub use core::{
    Block, Blockchain, LedgerError, Transaction, TransactionRequest, MINING_DIFFICULTY,
    MINING_REWARD, MINING_SENDER,
};
pub use crypto::KeyPair;
pub use mining::{Miner, TransactionPool};
pub use network::{HttpNotifier, PeerNotifier, PeerRegistry, RangeProbe};
pub use wallet::Wallet;

//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Transactions and transaction submissions
//! - Blocks (hash-linked, canonical JSON hashing)
//! - The ledger itself (pool admission, proof of work, mining)

pub mod block;
pub mod blockchain;
pub mod transaction;

pub use block::Block;
pub use blockchain::{
    Blockchain, LedgerError, MINING_DIFFICULTY, MINING_REWARD, MINING_SENDER,
};
pub use transaction::{
    Address, Amount, RequestError, SignedSubmission, Transaction, TransactionRequest,
};

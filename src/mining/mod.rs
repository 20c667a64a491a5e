//! Mining module: the transaction pool and the recurring miner

pub mod mempool;
pub mod miner;

pub use mempool::TransactionPool;
pub use miner::{Miner, MiningStats};

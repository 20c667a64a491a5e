//! Wallet module for key management and signed submissions

pub mod wallet;

pub use wallet::{Wallet, WalletError};

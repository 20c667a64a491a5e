//! Transaction pool for pending transactions
//!
//! Holds unconfirmed transactions in arrival order until a mining pass
//! seals them. The pool itself is not synchronized; the ledger wraps it
//! in its own lock.

use crate::core::Transaction;

/// Ordered pool of pending transactions
#[derive(Debug, Default, Clone)]
pub struct TransactionPool {
    transactions: Vec<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction at the end of the pool
    pub fn push(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Independent copy of the pool contents
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    /// Remove and return every pending transaction
    pub fn take_all(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    /// Remove a previously taken snapshot from the pool.
    ///
    /// Admissions only ever append, so the snapshot is a prefix unless the
    /// pool was cleared in between. After a clear every pending entry is a
    /// later admission and the pool is left as it is, even where an entry
    /// equals a sealed one.
    pub fn remove_sealed(&mut self, sealed: &[Transaction]) {
        if self.transactions.starts_with(sealed) {
            self.transactions.drain(..sealed.len());
        }
    }

    /// Remove the most recent occurrence of `tx`, returning whether one was found
    pub fn remove_last(&mut self, tx: &Transaction) -> bool {
        match self.transactions.iter().rposition(|t| t == tx) {
            Some(pos) => {
                self.transactions.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

//! Ledger implementation
//!
//! `Blockchain` owns the chain and the transaction pool, admits signed
//! transfers, and seals the pool into new blocks through a proof-of-work
//! search. Mining passes are serialized by a dedicated lock that covers
//! reward admission, the search, and the append as one unit; the pool has
//! its own short-lived lock so admissions are never held up by a search.

use crate::core::block::Block;
use crate::core::transaction::{Address, Amount, Transaction, TransactionRequest};
use crate::crypto::{meets_difficulty, public_key_to_hex, signature_to_hex, verify_signature, Digest};
use crate::mining::{MiningStats, TransactionPool};
use crate::network::{NoopNotifier, PeerNotifier, PeerRegistry};
use parking_lot::{Mutex, RwLock};
use secp256k1::ecdsa::Signature;
use secp256k1::PublicKey;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Number of leading zero hex digits a proof must produce
pub const MINING_DIFFICULTY: usize = 3;

/// Reserved sender of mining rewards
pub const MINING_SENDER: &str = "THE BLOCKCHAIN";

/// Reward paid to the ledger owner for every sealed block
pub const MINING_REWARD: Amount = 1.0;

/// How long a pass waits on the mining lock before rechecking cancellation
const MINING_LOCK_POLL: Duration = Duration::from_millis(50);

/// Ledger errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Mining cancelled")]
    Cancelled,
    #[error("Nonce space exhausted")]
    NonceSpaceExhausted,
}

/// The ledger: chain, pool, and the mining discipline around them
pub struct Blockchain {
    /// Append-only chain, genesis first
    chain: RwLock<Vec<Block>>,
    /// Transactions not yet sealed
    pool: Mutex<TransactionPool>,
    /// Owner address receiving mining rewards
    blockchain_address: Address,
    /// Fixed proof-of-work difficulty
    difficulty: usize,
    /// Held for the whole of a mining pass
    mining_lock: Mutex<()>,
    peers: Arc<PeerRegistry>,
    notifier: Arc<dyn PeerNotifier>,
}

impl Blockchain {
    /// Create a ledger with genesis block and the default difficulty
    pub fn new(blockchain_address: &str) -> Self {
        Self::with_difficulty(blockchain_address, MINING_DIFFICULTY)
    }

    /// Create a ledger with custom difficulty
    pub fn with_difficulty(blockchain_address: &str, difficulty: usize) -> Self {
        let genesis = Block::new(0, Block::default().hash(), Vec::new());

        Self {
            chain: RwLock::new(vec![genesis]),
            pool: Mutex::new(TransactionPool::new()),
            blockchain_address: blockchain_address.to_string(),
            difficulty,
            mining_lock: Mutex::new(()),
            peers: Arc::new(PeerRegistry::new()),
            notifier: Arc::new(NoopNotifier),
        }
    }

    /// Attach the neighbor registry and the notifier used for fan-out
    pub fn with_network(mut self, peers: Arc<PeerRegistry>, notifier: Arc<dyn PeerNotifier>) -> Self {
        self.peers = peers;
        self.notifier = notifier;
        self
    }

    pub fn blockchain_address(&self) -> &str {
        &self.blockchain_address
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn peers(&self) -> &Arc<PeerRegistry> {
        &self.peers
    }

    // =========================================================================
    // Chain access
    // =========================================================================

    /// Snapshot of the whole chain
    pub fn chain(&self) -> Vec<Block> {
        self.chain.read().clone()
    }

    /// Number of blocks, genesis included
    pub fn chain_len(&self) -> usize {
        self.chain.read().len()
    }

    /// Get the latest block
    pub fn last_block(&self) -> Block {
        self.chain.read().last().cloned().unwrap_or_default()
    }

    fn tip_hash(&self) -> Digest {
        self.chain.read().last().map(Block::hash).unwrap_or_default()
    }

    /// Seal the whole pool into a new block, reset the pool, and tell
    /// every neighbor to clear theirs.
    pub fn create_block(&self, nonce: u64, previous_hash: Digest) -> Block {
        let block = {
            let _mining = self.mining_lock.lock();
            let mut chain = self.chain.write();
            let transactions = self.pool.lock().take_all();
            let block = Block::new(nonce, previous_hash, transactions);
            chain.push(block.clone());
            block
        };

        self.announce_block();
        block
    }

    /// Append a block holding exactly `transactions` and drop them from the pool.
    /// Caller holds the mining lock.
    fn seal(&self, nonce: u64, previous_hash: Digest, transactions: Vec<Transaction>) -> Block {
        let mut chain = self.chain.write();
        self.pool.lock().remove_sealed(&transactions);
        let block = Block::new(nonce, previous_hash, transactions);
        chain.push(block.clone());
        block
    }

    fn announce_block(&self) {
        for peer in self.peers.neighbors() {
            self.notifier.clear_transactions(&peer);
        }
    }

    /// Check hash links and, past genesis, each block's proof
    pub fn is_valid_chain(&self) -> bool {
        let chain = self.chain.read();

        chain.windows(2).all(|pair| {
            let (previous, current) = (&pair[0], &pair[1]);
            *current.previous_hash() == previous.hash()
                && Self::is_valid_proof(
                    current.nonce(),
                    current.previous_hash(),
                    current.transactions(),
                    self.difficulty,
                )
        })
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Admit a transaction into the pool.
    ///
    /// The minter identity is admitted unconditionally; every other sender
    /// needs a signature that verifies under `public_key`. Balances are not
    /// checked, so overdrafts are admitted.
    pub fn add_transaction(
        &self,
        sender: &str,
        recipient: &str,
        value: Amount,
        public_key: Option<&PublicKey>,
        signature: Option<&Signature>,
    ) -> bool {
        let tx = Transaction::new(sender, recipient, value);

        if sender == MINING_SENDER {
            self.pool.lock().push(tx);
            return true;
        }

        let verified = match (public_key, signature) {
            (Some(public_key), Some(signature)) => {
                Self::verify_transaction_signature(public_key, signature, &tx)
            }
            _ => false,
        };

        if !verified {
            log::warn!("ERROR: Verify Transaction (sender={})", sender);
            return false;
        }

        self.pool.lock().push(tx);
        true
    }

    /// Admit a transaction and relay it to every neighbor on success
    pub fn create_transaction(
        &self,
        sender: &str,
        recipient: &str,
        value: Amount,
        public_key: Option<&PublicKey>,
        signature: Option<&Signature>,
    ) -> bool {
        if !self.add_transaction(sender, recipient, value, public_key, signature) {
            return false;
        }

        if let (Some(public_key), Some(signature)) = (public_key, signature) {
            let request = TransactionRequest {
                sender_blockchain_address: Some(sender.to_string()),
                recipient_blockchain_address: Some(recipient.to_string()),
                sender_public_key: Some(public_key_to_hex(public_key)),
                value: Some(value),
                signature: Some(signature_to_hex(signature)),
            };
            for peer in self.peers.neighbors() {
                self.notifier.relay_transaction(&peer, &request);
            }
        }

        true
    }

    /// Verify `signature` over the transaction's canonical hash
    pub fn verify_transaction_signature(
        public_key: &PublicKey,
        signature: &Signature,
        transaction: &Transaction,
    ) -> bool {
        verify_signature(public_key, &transaction.hash(), signature)
    }

    /// Deep copy of the pending transactions
    pub fn copy_pool(&self) -> Vec<Transaction> {
        self.pool.lock().snapshot()
    }

    pub fn pool_len(&self) -> usize {
        self.pool.lock().len()
    }

    /// Drop every pending transaction (a neighbor sealed them)
    pub fn clear_transaction_pool(&self) {
        self.pool.lock().clear();
    }

    /// Net amount received by `address` across all sealed blocks
    pub fn total_balance(&self, address: &str) -> Amount {
        let chain = self.chain.read();
        let mut total: Amount = 0.0;

        for tx in chain.iter().flat_map(|block| block.transactions()) {
            if tx.recipient() == address {
                total += tx.value();
            }
            if tx.sender() == address {
                total -= tx.value();
            }
        }

        total
    }

    // =========================================================================
    // Proof of work
    // =========================================================================

    /// True when the timestamp-zero candidate's hex hash starts with
    /// `difficulty` zeros.
    pub fn is_valid_proof(
        nonce: u64,
        previous_hash: &Digest,
        transactions: &[Transaction],
        difficulty: usize,
    ) -> bool {
        let candidate = Block::candidate(nonce, *previous_hash, transactions.to_vec());
        meets_difficulty(&candidate.hash(), difficulty)
    }

    /// Search a nonce for the current pool on top of the current tip
    pub fn proof_of_work(&self) -> Result<u64, LedgerError> {
        self.proof_of_work_until(&CancellationToken::new())
    }

    /// Like [`Blockchain::proof_of_work`], giving up once `cancel` fires
    pub fn proof_of_work_until(&self, cancel: &CancellationToken) -> Result<u64, LedgerError> {
        let transactions = self.copy_pool();
        let previous_hash = self.tip_hash();
        let (nonce, _) = search_nonce(previous_hash, transactions, self.difficulty, cancel)?;
        Ok(nonce)
    }

    /// Run one mining pass. Returns false when the pool is empty.
    pub fn mine(&self) -> bool {
        match self.mine_until(&CancellationToken::new()) {
            Ok(mined) => mined,
            Err(e) => {
                log::error!("action=mining, status=fail, error={}", e);
                false
            }
        }
    }

    /// Cancellable mining pass.
    ///
    /// On cancellation no block is appended and the reward admitted by
    /// this pass is taken back out of the pool. A pass waiting for another
    /// one to finish can be cancelled too.
    pub fn mine_until(&self, cancel: &CancellationToken) -> Result<bool, LedgerError> {
        let block = {
            let _mining = loop {
                if cancel.is_cancelled() {
                    return Err(LedgerError::Cancelled);
                }
                if let Some(guard) = self.mining_lock.try_lock_for(MINING_LOCK_POLL) {
                    break guard;
                }
            };
            let reward = Transaction::new(MINING_SENDER, &self.blockchain_address, MINING_REWARD);

            // Emptiness check, reward admission and snapshot share one pool
            // guard so the reward is always the last sealed transaction.
            let transactions = {
                let mut pool = self.pool.lock();
                if pool.is_empty() {
                    return Ok(false);
                }
                pool.push(reward.clone());
                pool.snapshot()
            };
            let previous_hash = self.tip_hash();

            let nonce = match search_nonce(previous_hash, transactions.clone(), self.difficulty, cancel) {
                Ok((nonce, stats)) => {
                    log::info!(
                        "Found nonce {} in {}ms ({} attempts, {:.2} H/s)",
                        nonce,
                        stats.time_ms,
                        stats.hash_attempts,
                        stats.hash_rate
                    );
                    nonce
                }
                Err(e) => {
                    self.pool.lock().remove_last(&reward);
                    return Err(e);
                }
            };

            self.seal(nonce, previous_hash, transactions)
        };

        self.announce_block();
        log::info!(
            "action=mining, status=success, transactions={}",
            block.tx_count()
        );
        Ok(true)
    }
}

/// Linear nonce search from zero over a fixed candidate
fn search_nonce(
    previous_hash: Digest,
    transactions: Vec<Transaction>,
    difficulty: usize,
    cancel: &CancellationToken,
) -> Result<(u64, MiningStats), LedgerError> {
    let start = Instant::now();
    let mut candidate = Block::candidate(0, previous_hash, transactions);

    loop {
        if cancel.is_cancelled() {
            return Err(LedgerError::Cancelled);
        }

        if meets_difficulty(&candidate.hash(), difficulty) {
            let nonce = candidate.nonce();
            return Ok((nonce, MiningStats::new(nonce.saturating_add(1), start.elapsed())));
        }

        candidate
            .advance_nonce()
            .ok_or(LedgerError::NonceSpaceExhausted)?;
    }
}

//! Mining engine for the ledger
//!
//! Drives `Blockchain::mine_until` on a fixed interval. Each pass runs on
//! the blocking pool and can be cut short by shutdown or by an optional
//! per-pass timeout.

use crate::core::{Blockchain, LedgerError};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Mining statistics
#[derive(Debug, Clone)]
pub struct MiningStats {
    /// Number of hash attempts
    pub hash_attempts: u64,
    /// Time taken in milliseconds
    pub time_ms: u128,
    /// Hash rate (hashes per second)
    pub hash_rate: f64,
}

impl MiningStats {
    pub fn new(hash_attempts: u64, elapsed: Duration) -> Self {
        let time_ms = elapsed.as_millis();
        let hash_rate = if time_ms > 0 {
            (hash_attempts as f64) / (time_ms as f64 / 1000.0)
        } else {
            hash_attempts as f64
        };

        Self {
            hash_attempts,
            time_ms,
            hash_rate,
        }
    }
}

/// Recurring miner for one ledger
pub struct Miner {
    blockchain: Arc<Blockchain>,
    interval: Duration,
    timeout: Option<Duration>,
}

impl Miner {
    /// Create a new miner
    pub fn new(blockchain: Arc<Blockchain>, interval: Duration) -> Self {
        Self {
            blockchain,
            interval,
            timeout: None,
        }
    }

    /// Cancel any single pass that runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one mining pass off the async runtime
    pub async fn mine_once(&self, shutdown: &CancellationToken) -> Result<bool, LedgerError> {
        let pass = shutdown.child_token();

        let deadline = self.timeout.map(|timeout| {
            let pass = pass.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                pass.cancel();
            })
        });

        let blockchain = Arc::clone(&self.blockchain);
        let token = pass.clone();
        let result = tokio::task::spawn_blocking(move || blockchain.mine_until(&token)).await;

        if let Some(deadline) = deadline {
            deadline.abort();
        }

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Mining task failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Mine every `interval` until `shutdown` is cancelled. The first
    /// pass starts immediately.
    pub async fn run(self, shutdown: CancellationToken) {
        info!("Mining every {:?}", self.interval);
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match self.mine_once(&shutdown).await {
                        Ok(true) => {}
                        Ok(false) => debug!("action=mining, status=skipped (empty pool)"),
                        Err(e) => warn!("action=mining, status=fail, error={}", e),
                    }
                }
            }
        }

        info!("Stopped mining");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MINING_SENDER;

    #[test]
    fn test_mining_stats() {
        let stats = MiningStats::new(2_000, Duration::from_millis(500));
        assert_eq!(stats.time_ms, 500);
        assert!((stats.hash_rate - 4_000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_mine_once() {
        let blockchain = Arc::new(Blockchain::new("owner"));
        blockchain.add_transaction(MINING_SENDER, "someone", 1.0, None, None);
        let miner = Miner::new(Arc::clone(&blockchain), Duration::from_secs(20));

        let mined = miner.mine_once(&CancellationToken::new()).await.unwrap();

        assert!(mined);
        assert_eq!(blockchain.chain_len(), 2);
        assert_eq!(blockchain.pool_len(), 0);
    }

    #[tokio::test]
    async fn test_mine_once_times_out() {
        // 16 leading zero digits is out of reach
        let blockchain = Arc::new(Blockchain::with_difficulty("owner", 16));
        blockchain.add_transaction(MINING_SENDER, "someone", 1.0, None, None);
        let miner = Miner::new(Arc::clone(&blockchain), Duration::from_secs(20))
            .with_timeout(Some(Duration::from_millis(50)));

        let result = miner.mine_once(&CancellationToken::new()).await;

        assert!(matches!(result, Err(LedgerError::Cancelled)));
        assert_eq!(blockchain.chain_len(), 1);
        assert_eq!(blockchain.pool_len(), 1);
    }

    #[tokio::test]
    async fn test_run_mines_until_shutdown() {
        let blockchain = Arc::new(Blockchain::with_difficulty("owner", 2));
        blockchain.add_transaction(MINING_SENDER, "someone", 1.0, None, None);
        let shutdown = CancellationToken::new();

        let miner = Miner::new(Arc::clone(&blockchain), Duration::from_millis(10));
        let task = tokio::spawn(miner.run(shutdown.clone()));

        tokio::time::timeout(Duration::from_secs(10), async {
            while blockchain.chain_len() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        shutdown.cancel();
        task.await.unwrap();

        // Only the reward pass ran; later ticks found an empty pool
        assert_eq!(blockchain.chain_len(), 2);
        assert_eq!(blockchain.total_balance("owner"), 1.0);
    }
}

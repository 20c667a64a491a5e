//! Peer registry
//!
//! The set of known neighbors, replaced wholesale on every refresh.
//! Refreshes are serialized by a lock of their own so that a slow probe
//! never blocks mining, and readers always see a complete list.

use crate::network::discovery::NeighborProbe;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Registry of neighbor addresses ("host:port")
#[derive(Debug, Default)]
pub struct PeerRegistry {
    neighbors: RwLock<Vec<String>>,
    refresh_lock: Mutex<()>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current neighbors
    pub fn neighbors(&self) -> Vec<String> {
        self.neighbors.read().clone()
    }

    /// Replace the neighbor list
    pub fn set_neighbors(&self, neighbors: Vec<String>) {
        let _guard = self.refresh_lock.lock();
        *self.neighbors.write() = neighbors;
    }

    /// Re-run discovery and replace the neighbor list with its result
    pub fn refresh(&self, probe: &dyn NeighborProbe) {
        let _guard = self.refresh_lock.lock();
        let found = probe.discover();
        log::info!("action=sync_neighbors, neighbors={:?}", found);
        *self.neighbors.write() = found;
    }

    /// Refresh on a fixed interval until `shutdown` is cancelled.
    /// Probing blocks on TCP connects, so each round runs on the blocking pool.
    pub async fn run_sync(
        self: Arc<Self>,
        probe: Arc<dyn NeighborProbe>,
        interval: Duration,
        shutdown: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let registry = Arc::clone(&self);
                    let probe = Arc::clone(&probe);
                    let round = tokio::task::spawn_blocking(move || registry.refresh(probe.as_ref()));
                    if let Err(e) = round.await {
                        log::error!("Neighbor refresh task failed: {}", e);
                    }
                }
            }
        }

        log::info!("Stopped neighbor sync");
    }
}

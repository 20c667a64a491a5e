//! Peer networking
//!
//! Provides the minimal peer layer the ledger needs:
//! - Neighbor discovery over a host/port window
//! - A registry of neighbors refreshed on a timer
//! - Fire-and-forget notifications (pool clears, transaction relays)

pub mod discovery;
pub mod notifier;
pub mod peers;

pub use discovery::{NeighborProbe, RangeProbe};
pub use notifier::{HttpNotifier, NoopNotifier, NotifyError, PeerNotifier};
pub use peers::PeerRegistry;

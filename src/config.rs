//! Node configuration
//!
//! Plain values handed to the ledger, the timers and the transport. The
//! defaults are the reference network's constants; `main` overrides them
//! from the command line.

use crate::core::MINING_DIFFICULTY;
use crate::network::RangeProbe;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Seconds between recurring mining passes
pub const MINING_TIMER_SEC: u64 = 20;

/// Seconds between neighbor refreshes
pub const BLOCKCHAIN_NEIGHBOR_SYNC_TIME_SEC: u64 = 10;

/// Ports scanned for neighbors
pub const BLOCKCHAIN_PORT_RANGE: RangeInclusive<u16> = 5000..=5003;

/// Offsets added to our last IPv4 octet when scanning for neighbors
pub const NEIGHBOR_IP_RANGE: RangeInclusive<u8> = 0..=1;

/// Node configuration
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Host used for the listener and as the base of neighbor scans
    pub host: Ipv4Addr,
    /// Port to listen on
    pub port: u16,
    /// Proof-of-work difficulty (leading zero hex digits)
    pub difficulty: usize,
    /// Interval of the recurring miner
    pub mining_interval: Duration,
    /// Upper bound on a single mining pass, if any
    pub mining_timeout: Option<Duration>,
    /// Start the recurring miner at boot instead of on `/mine/start`
    pub auto_mine: bool,
    /// Interval of neighbor refreshes
    pub neighbor_sync_interval: Duration,
    pub neighbor_ip_range: RangeInclusive<u8>,
    pub neighbor_port_range: RangeInclusive<u16>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::LOCALHOST,
            port: DEFAULT_PORT,
            difficulty: MINING_DIFFICULTY,
            mining_interval: Duration::from_secs(MINING_TIMER_SEC),
            mining_timeout: None,
            auto_mine: false,
            neighbor_sync_interval: Duration::from_secs(BLOCKCHAIN_NEIGHBOR_SYNC_TIME_SEC),
            neighbor_ip_range: NEIGHBOR_IP_RANGE,
            neighbor_port_range: BLOCKCHAIN_PORT_RANGE,
        }
    }
}

impl NodeConfig {
    /// Address the HTTP listener binds to
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Neighbor probe scanning the configured window around this node
    pub fn neighbor_probe(&self) -> RangeProbe {
        RangeProbe {
            host: self.host,
            port: self.port,
            ip_offsets: self.neighbor_ip_range.clone(),
            ports: self.neighbor_port_range.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_network() {
        let config = NodeConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.difficulty, 3);
        assert_eq!(config.mining_interval, Duration::from_secs(20));
        assert_eq!(config.neighbor_sync_interval, Duration::from_secs(10));
        assert!(config.mining_timeout.is_none());
    }

    #[test]
    fn test_neighbor_probe_uses_config() {
        let config = NodeConfig {
            port: 5001,
            ..Default::default()
        };
        let probe = config.neighbor_probe();
        assert_eq!(probe.port, 5001);
        assert_eq!(probe.ports, 5000..=5003);
        assert_eq!(probe.candidates().len(), 7);
    }
}

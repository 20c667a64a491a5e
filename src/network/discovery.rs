//! Neighbor discovery
//!
//! Finds candidate peers by walking a small window of host addresses
//! and ports around our own, keeping those that accept a TCP connection.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream};
use std::ops::RangeInclusive;
use std::time::Duration;

/// How long to wait for a candidate to accept a connection
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Source of neighbor addresses for the peer registry
pub trait NeighborProbe: Send + Sync {
    /// Return the current set of reachable neighbors as "host:port"
    fn discover(&self) -> Vec<String>;
}

/// Probe that scans `host + offset` for each offset and port in range
#[derive(Debug, Clone)]
pub struct RangeProbe {
    /// Our own host
    pub host: Ipv4Addr,
    /// Our own port, skipped when scanning our host
    pub port: u16,
    /// Offsets added to the last octet of `host`
    pub ip_offsets: RangeInclusive<u8>,
    /// Ports tried on every candidate host
    pub ports: RangeInclusive<u16>,
}

impl RangeProbe {
    /// Every candidate address except our own
    pub fn candidates(&self) -> Vec<SocketAddrV4> {
        let [a, b, c, d] = self.host.octets();
        let own = SocketAddrV4::new(self.host, self.port);

        let mut candidates = Vec::new();
        for offset in self.ip_offsets.clone() {
            let Some(last) = d.checked_add(offset) else {
                continue;
            };
            let ip = Ipv4Addr::new(a, b, c, last);
            for port in self.ports.clone() {
                let addr = SocketAddrV4::new(ip, port);
                if addr != own {
                    candidates.push(addr);
                }
            }
        }
        candidates
    }
}

impl NeighborProbe for RangeProbe {
    fn discover(&self) -> Vec<String> {
        self.candidates()
            .into_iter()
            .filter(|addr| is_reachable(SocketAddr::V4(*addr)))
            .map(|addr| addr.to_string())
            .collect()
    }
}

fn is_reachable(addr: SocketAddr) -> bool {
    TcpStream::connect_timeout(&addr, PROBE_TIMEOUT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_candidates_skip_self() {
        let probe = RangeProbe {
            host: Ipv4Addr::new(127, 0, 0, 1),
            port: 5000,
            ip_offsets: 0..=1,
            ports: 5000..=5003,
        };

        let candidates = probe.candidates();
        assert_eq!(candidates.len(), 7);
        assert!(!candidates.contains(&"127.0.0.1:5000".parse().unwrap()));
        assert!(candidates.contains(&"127.0.0.2:5003".parse().unwrap()));
    }

    #[test]
    fn test_candidates_do_not_wrap_octet() {
        let probe = RangeProbe {
            host: Ipv4Addr::new(10, 0, 0, 255),
            port: 1,
            ip_offsets: 0..=1,
            ports: 2..=2,
        };
        assert_eq!(probe.candidates(), vec!["10.0.0.255:2".parse().unwrap()]);
    }

    #[test]
    fn test_discover_finds_listening_neighbor() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let open_port = listener.local_addr().unwrap().port();

        let probe = RangeProbe {
            host: Ipv4Addr::LOCALHOST,
            port: 0,
            ip_offsets: 0..=0,
            ports: open_port..=open_port,
        };

        assert_eq!(probe.discover(), vec![format!("127.0.0.1:{}", open_port)]);
    }
}

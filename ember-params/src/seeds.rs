use chrono::{DateTime, Duration, Utc};
use log::debug;
use rand::Rng;
use std::net::{Ipv6Addr, SocketAddrV6};

use crate::ONE_WEEK_SECS;

/// One compiled-in bootstrap endpoint: a 16-byte IPv6 address (IPv4 peers
/// use the `::ffff:a.b.c.d` mapping) and a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSpec {
    pub addr: [u8; 16],
    pub port: u16,
}

const fn ipv4_seed(a: u8, b: u8, c: u8, d: u8, port: u16) -> SeedSpec {
    SeedSpec {
        addr: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, a, b, c, d],
        port,
    }
}

// TODO: replace both tables with the published seed node list. These entries
// are placeholders from the documentation ranges (RFC 5737) and do not reach
// any node.
pub const MAIN_FIXED_SEEDS: [SeedSpec; 4] = [
    ipv4_seed(192, 0, 2, 17, 11628),
    ipv4_seed(192, 0, 2, 54, 11628),
    ipv4_seed(198, 51, 100, 23, 11628),
    ipv4_seed(203, 0, 113, 90, 11628),
];

pub const TESTNET_FIXED_SEEDS: [SeedSpec; 2] = [
    ipv4_seed(198, 51, 100, 201, 21628),
    ipv4_seed(203, 0, 113, 7, 21628),
];

/// A bootstrap peer with the last-seen time it is advertised under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedAddress {
    pub addr: Ipv6Addr,
    pub port: u16,
    pub last_seen: DateTime<Utc>,
}

impl SeedAddress {
    pub fn socket_addr(&self) -> SocketAddrV6 {
        SocketAddrV6::new(self.addr, self.port, 0, 0)
    }

    pub fn is_ipv4_mapped(&self) -> bool {
        self.addr.to_ipv4_mapped().is_some()
    }
}

/// Stamps each seed with a last-seen time strictly between two weeks and one
/// week before `now`, so fixed seeds never look fresher than gossiped peers.
pub fn bootstrap_with<R: Rng + ?Sized>(
    table: &[SeedSpec],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<SeedAddress> {
    let one_week = Duration::seconds(ONE_WEEK_SECS);
    table
        .iter()
        .map(|spec| {
            let extra = Duration::seconds(rng.gen_range(1..ONE_WEEK_SECS));
            SeedAddress {
                addr: Ipv6Addr::from(spec.addr),
                port: spec.port,
                last_seen: now - one_week - extra,
            }
        })
        .collect()
}

/// [`bootstrap_with`] against the wall clock and the thread-local RNG.
pub fn bootstrap(table: &[SeedSpec]) -> Vec<SeedAddress> {
    let seeds = bootstrap_with(table, Utc::now(), &mut rand::thread_rng());
    debug!("Bootstrapped {} fixed seeds", seeds.len());
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_bootstrap_preserves_order_and_endpoints() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(7);
        let seeds = bootstrap_with(&MAIN_FIXED_SEEDS, now, &mut rng);

        assert_eq!(seeds.len(), MAIN_FIXED_SEEDS.len());
        for (seed, spec) in seeds.iter().zip(MAIN_FIXED_SEEDS.iter()) {
            assert_eq!(seed.addr.octets(), spec.addr);
            assert_eq!(seed.port, spec.port);
        }
    }

    #[test]
    fn test_last_seen_strictly_between_one_and_two_weeks_ago() {
        let now = Utc::now();
        let one_week = Duration::seconds(ONE_WEEK_SECS);
        let table = vec![MAIN_FIXED_SEEDS[0]; 500];

        for seed in bootstrap_with(&table, now, &mut rand::thread_rng()) {
            assert!(seed.last_seen < now - one_week);
            assert!(seed.last_seen > now - one_week - one_week);
        }
    }

    #[test]
    fn test_bootstrap_uses_wall_clock() {
        let before = Utc::now();
        let seeds = bootstrap(&TESTNET_FIXED_SEEDS);
        let after = Utc::now();

        assert_eq!(seeds.len(), TESTNET_FIXED_SEEDS.len());
        for seed in &seeds {
            assert!(seed.last_seen < after - Duration::seconds(ONE_WEEK_SECS));
            assert!(seed.last_seen > before - Duration::seconds(2 * ONE_WEEK_SECS));
        }
    }

    #[test]
    fn test_tables_use_network_ports() {
        assert!(MAIN_FIXED_SEEDS.iter().all(|s| s.port == 11628));
        assert!(TESTNET_FIXED_SEEDS.iter().all(|s| s.port == 21628));
        for spec in MAIN_FIXED_SEEDS.iter().chain(TESTNET_FIXED_SEEDS.iter()) {
            assert!(Ipv6Addr::from(spec.addr).to_ipv4_mapped().is_some());
        }
    }

    #[test]
    fn test_empty_table() {
        assert!(bootstrap(&[]).is_empty());
    }

    #[test]
    fn test_socket_addr_and_mapping() {
        let seeds = bootstrap(&MAIN_FIXED_SEEDS[..1]);
        let seed = seeds[0];
        assert!(seed.is_ipv4_mapped());
        assert_eq!(seed.socket_addr().port(), 11628);
        assert_eq!(
            seed.addr.to_ipv4_mapped().unwrap().octets(),
            [192, 0, 2, 17]
        );
    }
}

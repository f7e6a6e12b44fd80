//! # Subnet Liveness
//!
//! A subnet counts as alive when enough of four sampled addresses (network + 1,
//! 10, 100 and 254) answer an ICMP echo. Cheap, and wrong in both directions: a
//! populated subnet whose hosts all sit elsewhere looks empty, and a stray reply
//! can make an empty one look alive.

use std::net::Ipv4Addr;
use std::time::Duration;

use futures::future::join_all;
use lanscout_common::network::subnet::Subnet;

use crate::probe::Prober;

pub const SAMPLE_OFFSETS: [u32; 4] = [1, 10, 100, 254];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub replies: usize,
    pub alive: bool,
}

pub fn is_alive(replies: usize, threshold: usize) -> bool {
    replies >= threshold
}

/// Sample addresses that fall inside `subnet`.
pub fn samples(subnet: Subnet) -> Vec<Ipv4Addr> {
    SAMPLE_OFFSETS
        .iter()
        .filter_map(|offset| subnet.offset(*offset))
        .collect()
}

/// Pings the samples concurrently and counts replies.
pub async fn classify(
    prober: &dyn Prober,
    subnet: Subnet,
    threshold: usize,
    timeout: Duration,
) -> Verdict {
    let replies = join_all(samples(subnet).into_iter().map(|ip| prober.ping(ip, timeout)))
        .await
        .into_iter()
        .filter(|replied| *replied)
        .count();

    Verdict {
        replies,
        alive: is_alive(replies, threshold),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::tests::StaticProber;
    use std::collections::HashSet;

    fn subnet() -> Subnet {
        Subnet::slash24(Ipv4Addr::new(10, 0, 7, 0))
    }

    fn prober_answering(last_octets: &[u8]) -> StaticProber {
        StaticProber {
            echo: last_octets.iter().map(|o| Ipv4Addr::new(10, 0, 7, *o)).collect::<HashSet<_>>(),
            ..StaticProber::default()
        }
    }

    #[test]
    fn samples_are_the_four_fixed_offsets() {
        let expected: Vec<Ipv4Addr> = [1, 10, 100, 254].iter().map(|o| Ipv4Addr::new(10, 0, 7, *o)).collect();
        assert_eq!(samples(subnet()), expected);
    }

    #[test]
    fn samples_outside_small_subnets_are_skipped() {
        let small = Subnet::new(Ipv4Addr::new(10, 0, 7, 0), 28).unwrap();
        assert_eq!(samples(small), vec![Ipv4Addr::new(10, 0, 7, 1), Ipv4Addr::new(10, 0, 7, 10)]);
    }

    #[tokio::test]
    async fn one_reply_is_alive_only_when_permissive() {
        let prober = prober_answering(&[100]);
        let timeout = Duration::from_millis(300);

        let permissive = classify(&prober, subnet(), 1, timeout).await;
        assert_eq!(permissive, Verdict { replies: 1, alive: true });

        let strict = classify(&prober, subnet(), 2, timeout).await;
        assert_eq!(strict, Verdict { replies: 1, alive: false });
    }

    #[tokio::test]
    async fn classification_is_deterministic() {
        let prober = prober_answering(&[1, 254, 77]);
        let timeout = Duration::from_millis(300);
        let first = classify(&prober, subnet(), 2, timeout).await;
        for _ in 0..5 {
            assert_eq!(classify(&prober, subnet(), 2, timeout).await, first);
        }
        assert_eq!(first.replies, 2);
    }

    #[tokio::test]
    async fn silent_subnet_is_not_alive() {
        let verdict = classify(&prober_answering(&[]), subnet(), 1, Duration::from_millis(300)).await;
        assert!(!verdict.alive);
        assert_eq!(verdict.replies, 0);
    }
}

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tokio::time::timeout;
use tracing::trace;

/// Reverse lookup through the system resolver, bounded by `lookup_timeout`.
///
/// The resolver call blocks, so it runs on the blocking pool. A lookup that
/// outlives the timeout is abandoned, not cancelled. Resolvers that echo the
/// address back as its own name count as no name.
pub async fn reverse_lookup(ip: Ipv4Addr, lookup_timeout: Duration) -> Option<String> {
    let lookup = tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&IpAddr::V4(ip)));

    let name = match timeout(lookup_timeout, lookup).await {
        Ok(Ok(Ok(name))) => name,
        Ok(Ok(Err(e))) => {
            trace!("no PTR record for {ip}: {e}");
            return None;
        }
        Ok(Err(join)) => {
            trace!("reverse lookup task for {ip} failed: {join}");
            return None;
        }
        Err(_elapsed) => {
            trace!("reverse lookup for {ip} timed out");
            return None;
        }
    };

    let name = name.trim_end_matches('.').to_string();
    (!name.is_empty() && name != ip.to_string()).then_some(name)
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

    #[tokio::test]
    #[ignore]
    async fn loopback_has_a_name() {
        let name = reverse_lookup(Ipv4Addr::LOCALHOST, Duration::from_secs(2)).await;
        assert!(name.is_some());
    }

    #[tokio::test]
    async fn zero_timeout_gives_up() {
        let name = reverse_lookup(Ipv4Addr::new(192, 0, 2, 1), Duration::ZERO).await;
        assert_eq!(name, None);
    }
}

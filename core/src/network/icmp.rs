//! ICMP echo over surge-ping.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use lanscout_common::error::ScanError;
use surge_ping::{Client, Config, IcmpPacket, PingIdentifier, PingSequence};
use tracing::trace;

const PAYLOAD: [u8; 56] = [0u8; 56];

pub struct IcmpPinger {
    client: Client,
}

impl IcmpPinger {
    /// Opens the ICMP socket. Needs root or `net.ipv4.ping_group_range` on Linux.
    pub fn open() -> Result<Self, ScanError> {
        let client = Client::new(&Config::default()).map_err(|e| ScanError::TransportUnavailable {
            layer: "icmp",
            reason: e.to_string(),
        })?;
        Ok(Self { client })
    }

    /// One echo request. `true` only for an IPv4 echo reply inside `timeout`.
    pub async fn echo(&self, ip: Ipv4Addr, timeout: Duration) -> bool {
        let result = self
            .client
            .pinger(IpAddr::V4(ip), PingIdentifier(rand::random()))
            .await
            .timeout(timeout)
            .ping(PingSequence(0), &PAYLOAD)
            .await;

        match result {
            Ok((IcmpPacket::V4(_), rtt)) => {
                trace!("echo reply from {ip} in {rtt:?}");
                true
            }
            Ok((IcmpPacket::V6(_), _)) => false,
            Err(e) => {
                trace!("no echo from {ip}: {e}");
                false
            }
        }
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

//! ARP sweep of one subnet over the shared datalink capture.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use lanscout_common::error::ScanError;
use lanscout_common::network::interface::{InterfaceExt, LinkIdentity};
use lanscout_common::network::subnet::Subnet;
use lanscout_protocols::arp;
use pnet::datalink::NetworkInterface;
use pnet::util::MacAddr;
use tokio::sync::Mutex;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, trace};

use super::channel::{self, EthernetHandle};

pub struct ArpSweeper {
    identity: LinkIdentity,
    handle: Mutex<EthernetHandle>,
}

impl ArpSweeper {
    /// Opens the capture on `intf`. Fails when the interface cannot send ARP or
    /// raw datalink access is denied.
    pub fn open(intf: &NetworkInterface) -> Result<Self, ScanError> {
        let identity = intf.link_identity().ok_or_else(|| ScanError::TransportUnavailable {
            layer: "datalink",
            reason: format!("{} has no MAC or private IPv4 address", intf.name),
        })?;
        let handle = channel::start_capture(intf).map_err(|e| ScanError::TransportUnavailable {
            layer: "datalink",
            reason: format!("{e:#}"),
        })?;
        Ok(Self::with_handle(identity, handle))
    }

    pub fn with_handle(identity: LinkIdentity, handle: EthernetHandle) -> Self {
        Self {
            identity,
            handle: Mutex::new(handle),
        }
    }

    /// Asks every host of `subnet` for its MAC and listens for `window`.
    ///
    /// Replies from outside the subnet are ignored and the first MAC per address
    /// wins. Stops early once every host answered.
    pub async fn sweep(&self, subnet: Subnet, window: Duration) -> HashMap<Ipv4Addr, MacAddr> {
        let mut handle = self.handle.lock().await;
        let stale = handle.drain();
        if stale > 0 {
            trace!("dropped {stale} stale frames before sweeping {subnet}");
        }

        let src_mac = self.identity.mac;
        let src_addr = self.identity.ipv4.ip();
        let mut requested = 0u64;
        for target in subnet.hosts() {
            let frame = match arp::create_request(src_mac, src_addr, target) {
                Ok(frame) => frame,
                Err(e) => {
                    debug!("could not build ARP request for {target}: {e}");
                    continue;
                }
            };
            match handle.tx.send_to(&frame, None) {
                Some(Err(e)) => debug!("ARP request to {target} failed: {e}"),
                _ => requested += 1,
            }
        }

        let deadline = Instant::now() + window;
        let mut found: HashMap<Ipv4Addr, MacAddr> = HashMap::new();
        while (found.len() as u64) < requested {
            let frame = match timeout_at(deadline, handle.rx.recv()).await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    debug!("capture closed while sweeping {subnet}");
                    break;
                }
                Err(_elapsed) => break,
            };
            let Some(reply) = arp::parse_reply(&frame) else {
                continue;
            };
            if !subnet.contains(reply.sender_ip) {
                trace!("ignoring ARP reply from {} outside {subnet}", reply.sender_ip);
                continue;
            }
            found.entry(reply.sender_ip).or_insert(reply.sender_mac);
        }

        debug!("{subnet}: {} of {requested} hosts answered ARP", found.len());
        found
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

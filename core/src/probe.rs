//! # Probe Primitives
//!
//! The one seam between the scan pipeline and the network. Every probe is bounded
//! by a timeout and reports a negative outcome as a value; nothing is retried.
//!
//! [`NetProber`] is the real implementation. Tests swap in a simulated network.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use lanscout_common::error::ScanError;
use lanscout_common::network::interface;
use lanscout_common::network::subnet::Subnet;
use pnet::util::MacAddr;
use tracing::info;

use crate::network::arp::ArpSweeper;
use crate::network::icmp::IcmpPinger;
use crate::network::{dns, snmp, tcp};

#[async_trait]
pub trait Prober: Send + Sync {
    /// One ICMP echo. `true` only on a reply within `timeout`.
    async fn ping(&self, ip: Ipv4Addr, timeout: Duration) -> bool;

    /// ARP requests for every host of `subnet`, replies collected for `window`.
    async fn arp_sweep(&self, subnet: Subnet, window: Duration) -> HashMap<Ipv4Addr, MacAddr>;

    /// `true` when a TCP connection to `ip:port` is established within `timeout`.
    async fn tcp_connect(&self, ip: Ipv4Addr, port: u16, timeout: Duration) -> bool;

    /// SNMPv2c GET of `oid`. `Err` only when no session could be created.
    async fn snmp_get(
        &self,
        ip: Ipv4Addr,
        oid: &[u64],
        community: &str,
        timeout: Duration,
    ) -> anyhow::Result<Option<String>>;

    async fn reverse_lookup(&self, ip: Ipv4Addr, timeout: Duration) -> Option<String>;
}

pub struct NetProber {
    interface: String,
    arp: ArpSweeper,
    icmp: IcmpPinger,
}

impl NetProber {
    /// Acquires the datalink capture and the ICMP socket.
    ///
    /// Either failing is [`ScanError::TransportUnavailable`]; nothing has been
    /// sent at that point.
    pub fn open(interface_name: Option<&str>) -> Result<Self, ScanError> {
        let intf = interface::select_interface(interface_name)?;
        let arp = ArpSweeper::open(&intf)?;
        let icmp = IcmpPinger::open()?;
        info!("Using interface {}", intf.name);
        Ok(Self {
            interface: intf.name,
            arp,
            icmp,
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

#[async_trait]
impl Prober for NetProber {
    async fn ping(&self, ip: Ipv4Addr, timeout: Duration) -> bool {
        self.icmp.echo(ip, timeout).await
    }

    async fn arp_sweep(&self, subnet: Subnet, window: Duration) -> HashMap<Ipv4Addr, MacAddr> {
        self.arp.sweep(subnet, window).await
    }

    async fn tcp_connect(&self, ip: Ipv4Addr, port: u16, timeout: Duration) -> bool {
        tcp::handshake_probe(ip, port, timeout).await
    }

    async fn snmp_get(
        &self,
        ip: Ipv4Addr,
        oid: &[u64],
        community: &str,
        timeout: Duration,
    ) -> anyhow::Result<Option<String>> {
        snmp::get(ip, oid, community, timeout).await
    }

    async fn reverse_lookup(&self, ip: Ipv4Addr, timeout: Duration) -> Option<String> {
        dns::reverse_lookup(ip, timeout).await
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

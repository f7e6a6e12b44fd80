//! # Host Record
//!
//! Everything known about one discovered IPv4 address.
//!
//! Records only ever gain information: a known MAC is never replaced, a resolved
//! hostname is set once, ports accumulate in a set, and the SNMP description is
//! only written on success. That keeps repeated enrichment runs idempotent.

use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;

use pnet::util::MacAddr;

use crate::network::subnet::Subnet;

/// Printed in place of a MAC address that has not been resolved.
pub const UNKNOWN_MAC: &str = "unknown";

/// The probe that first saw the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryMethod {
    /// Answered the ARP sweep of its subnet.
    Arp,
    /// Answered the ICMP host sweep of a deep scan.
    Icmp,
    /// Answered the repeated echo of ping-only mode.
    Echo,
}

impl fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arp => write!(f, "ARP"),
            Self::Icmp => write!(f, "ICMP"),
            Self::Echo => write!(f, "echo"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    ip: Ipv4Addr,
    pub subnet: Subnet,
    pub discovered_via: DiscoveryMethod,
    pub mac: Option<MacAddr>,
    pub vendor: Option<String>,
    pub hostname: Option<String>,
    pub os_description: Option<String>,
    pub open_ports: BTreeSet<u16>,
}

impl HostRecord {
    pub fn new(ip: Ipv4Addr, subnet: Subnet, discovered_via: DiscoveryMethod) -> Self {
        Self {
            ip,
            subnet,
            discovered_via,
            mac: None,
            vendor: None,
            hostname: None,
            os_description: None,
            open_ports: BTreeSet::new(),
        }
    }

    pub fn with_mac(mut self, mac: MacAddr) -> Self {
        self.mac = Some(mac);
        self
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    /// Stores a MAC unless one is already known. Returns whether it was stored.
    pub fn learn_mac(&mut self, mac: MacAddr) -> bool {
        if self.mac.is_some() {
            return false;
        }
        self.mac = Some(mac);
        true
    }

    /// Stores a resolved name unless one is already known. Empty names are ignored.
    pub fn learn_hostname(&mut self, name: String) -> bool {
        if self.hostname.is_some() || name.trim().is_empty() {
            return false;
        }
        self.hostname = Some(name);
        true
    }

    pub fn learn_os(&mut self, description: String) -> bool {
        let description = description.trim();
        if description.is_empty() || self.os_description.as_deref() == Some(description) {
            return false;
        }
        self.os_description = Some(description.to_string());
        true
    }

    /// Adds open ports and returns how many were new.
    pub fn add_ports(&mut self, ports: impl IntoIterator<Item = u16>) -> usize {
        ports
            .into_iter()
            .filter(|p| *p != 0)
            .filter(|p| self.open_ports.insert(*p))
            .count()
    }

    /// MAC for display, `"unknown"` until resolved.
    pub fn mac_display(&self) -> String {
        self.mac
            .map(|mac| mac.to_string())
            .unwrap_or_else(|| UNKNOWN_MAC.to_string())
    }

    /// Hostname for display, the IP literal until resolved.
    pub fn hostname_display(&self) -> String {
        self.hostname.clone().unwrap_or_else(|| self.ip.to_string())
    }

    pub fn os_display(&self) -> &str {
        self.os_description.as_deref().unwrap_or("")
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

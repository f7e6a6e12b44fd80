use std::cmp::Ordering;
use std::fmt;
use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::ScanError;

/// Prefix every generated subnet uses unless the user asked for something else.
pub const DEFAULT_PREFIX: u8 = 24;

/// An IPv4 network, always stored by its network address.
///
/// `Subnet::new(10.0.5.77, 24)` and `Subnet::new(10.0.5.0, 24)` are the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    net: Ipv4Network,
}

impl Subnet {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, ScanError> {
        if prefix > 32 {
            return Err(ScanError::InvalidTarget {
                input: format!("{addr}/{prefix}"),
                reason: format!("prefix /{prefix} is larger than 32"),
            });
        }
        Ok(Self::from_u32(addr.into(), prefix))
    }

    /// The /24 that contains `addr`.
    pub fn slash24(addr: Ipv4Addr) -> Self {
        let network = u32::from(addr) & 0xFFFF_FF00;
        Self::from_u32(network, DEFAULT_PREFIX)
    }

    /// A single address, used when a manual target is one IP.
    pub fn single(addr: Ipv4Addr) -> Self {
        Self::from_u32(u32::from(addr), 32)
    }

    pub(crate) fn from_u32(network: u32, prefix: u8) -> Self {
        let mask: u32 = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
        // prefix is always <= 32 at every call site
        let net = Ipv4Network::new(Ipv4Addr::from(network & mask), prefix)
            .unwrap_or_else(|_| Ipv4Network::from(Ipv4Addr::from(network)));
        Self { net }
    }

    pub fn network(&self) -> Ipv4Addr {
        self.net.network()
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        self.net.broadcast()
    }

    pub fn prefix(&self) -> u8 {
        self.net.prefix()
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.net.contains(ip)
    }

    /// Network address plus `n`, or `None` when that falls outside the subnet.
    pub fn offset(&self, n: u32) -> Option<Ipv4Addr> {
        let base: u32 = self.network().into();
        let addr = Ipv4Addr::from(base.checked_add(n)?);
        self.contains(addr).then_some(addr)
    }

    /// Usable host addresses.
    ///
    /// Network and broadcast are skipped for prefixes up to /30. A /31 yields both
    /// of its addresses and a /32 yields the address itself.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let start: u32 = self.network().into();
        let end: u32 = self.broadcast().into();
        let (first, last) = match self.prefix() {
            31 | 32 => (start, end),
            _ => (start + 1, end - 1),
        };
        (first..=last).map(Ipv4Addr::from)
    }

    pub fn host_count(&self) -> u64 {
        match self.prefix() {
            32 => 1,
            31 => 2,
            p => (1u64 << (32 - p)) - 2,
        }
    }
}

impl From<Ipv4Network> for Subnet {
    fn from(net: Ipv4Network) -> Self {
        Self::from_u32(net.network().into(), net.prefix())
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix())
    }
}

impl Ord for Subnet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.network()
            .cmp(&other.network())
            .then(self.prefix().cmp(&other.prefix()))
    }
}

impl PartialOrd for Subnet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
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

    #[test]
    fn new_normalizes_to_network_address() {
        let a = Subnet::new(Ipv4Addr::new(10, 0, 5, 77), 24).unwrap();
        let b = Subnet::new(Ipv4Addr::new(10, 0, 5, 0), 24).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.network(), Ipv4Addr::new(10, 0, 5, 0));
        assert_eq!(a.to_string(), "10.0.5.0/24");
    }

    #[test]
    fn new_rejects_prefix_over_32() {
        assert!(Subnet::new(Ipv4Addr::new(10, 0, 0, 0), 33).is_err());
    }

    #[test]
    fn slash24_masks_last_octet() {
        let s = Subnet::slash24(Ipv4Addr::new(192, 168, 7, 200));
        assert_eq!(s.to_string(), "192.168.7.0/24");
    }

    #[test]
    fn hosts_skip_network_and_broadcast() {
        let s = Subnet::slash24(Ipv4Addr::new(192, 168, 1, 0));
        let hosts: Vec<Ipv4Addr> = s.hosts().collect();
        assert_eq!(hosts.len(), 254);
        assert_eq!(hosts.first(), Some(&Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(hosts.last(), Some(&Ipv4Addr::new(192, 168, 1, 254)));
        assert_eq!(s.host_count(), 254);
    }

    #[test]
    fn hosts_of_tiny_prefixes() {
        let single = Subnet::single(Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(single.hosts().collect::<Vec<_>>(), vec![Ipv4Addr::new(10, 1, 2, 3)]);
        assert_eq!(single.host_count(), 1);

        let pair = Subnet::new(Ipv4Addr::new(10, 1, 2, 4), 31).unwrap();
        assert_eq!(pair.hosts().count(), 2);
    }

    #[test]
    fn offset_stays_inside_subnet() {
        let s = Subnet::slash24(Ipv4Addr::new(10, 0, 1, 0));
        assert_eq!(s.offset(254), Some(Ipv4Addr::new(10, 0, 1, 254)));
        assert_eq!(s.offset(256), None);
    }

    #[test]
    fn ordering_is_by_network_then_prefix() {
        let a = Subnet::slash24(Ipv4Addr::new(10, 0, 1, 0));
        let b = Subnet::slash24(Ipv4Addr::new(10, 0, 2, 0));
        let c = Subnet::new(Ipv4Addr::new(10, 0, 1, 0), 25).unwrap();
        assert!(a < b);
        assert!(a < c);
    }
}

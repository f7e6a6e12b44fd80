use std::collections::HashMap;
use std::net::Ipv4Addr;

use lanscout_common::host::{DiscoveryMethod, HostRecord};
use lanscout_common::network::subnet::Subnet;
use pnet::util::MacAddr;

/// Every host a session has seen, keyed by IP.
///
/// The first discovery fixes a host's subnet and method. Later discoveries can
/// only fill in a MAC that is still unknown.
#[derive(Debug, Default)]
pub struct HostTable {
    hosts: HashMap<Ipv4Addr, HostRecord>,
}

impl HostTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sighting. Returns `true` when the IP was not known before.
    pub fn discover(
        &mut self,
        ip: Ipv4Addr,
        subnet: Subnet,
        method: DiscoveryMethod,
        mac: Option<MacAddr>,
    ) -> bool {
        match self.hosts.get_mut(&ip) {
            Some(known) => {
                if let Some(mac) = mac {
                    known.learn_mac(mac);
                }
                false
            }
            None => {
                let mut record = HostRecord::new(ip, subnet, method);
                record.mac = mac;
                self.hosts.insert(ip, record);
                true
            }
        }
    }

    pub fn get(&self, ip: &Ipv4Addr) -> Option<&HostRecord> {
        self.hosts.get(ip)
    }

    pub fn get_mut(&mut self, ip: &Ipv4Addr) -> Option<&mut HostRecord> {
        self.hosts.get_mut(ip)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Copies of all records, sorted by IP.
    pub fn snapshot(&self) -> Vec<HostRecord> {
        let mut hosts: Vec<HostRecord> = self.hosts.values().cloned().collect();
        hosts.sort_by_key(HostRecord::ip);
        hosts
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

    const MAC: MacAddr = MacAddr(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff);

    fn ip(last: u8) -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 1, last)
    }

    fn subnet() -> Subnet {
        Subnet::slash24(ip(0))
    }

    #[test]
    fn arp_then_icmp_keeps_one_record_with_mac() {
        let mut table = HostTable::new();
        assert!(table.discover(ip(10), subnet(), DiscoveryMethod::Arp, Some(MAC)));
        assert!(!table.discover(ip(10), subnet(), DiscoveryMethod::Icmp, None));

        assert_eq!(table.len(), 1);
        let host = table.get(&ip(10)).unwrap();
        assert_eq!(host.mac, Some(MAC));
        assert_eq!(host.mac_display(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(host.discovered_via, DiscoveryMethod::Arp);
    }

    #[test]
    fn later_mac_fills_unknown_but_never_replaces() {
        let mut table = HostTable::new();
        table.discover(ip(20), subnet(), DiscoveryMethod::Icmp, None);
        table.discover(ip(20), subnet(), DiscoveryMethod::Arp, Some(MAC));
        table.discover(ip(20), subnet(), DiscoveryMethod::Arp, Some(MacAddr::zero()));

        let host = table.get(&ip(20)).unwrap();
        assert_eq!(host.mac, Some(MAC));
        assert_eq!(host.discovered_via, DiscoveryMethod::Icmp);
    }

    #[test]
    fn first_subnet_is_kept() {
        let mut table = HostTable::new();
        let other = Subnet::new(ip(0), 16).unwrap();
        table.discover(ip(30), subnet(), DiscoveryMethod::Arp, Some(MAC));
        table.discover(ip(30), other, DiscoveryMethod::Arp, Some(MAC));
        assert_eq!(table.get(&ip(30)).unwrap().subnet, subnet());
    }

    #[test]
    fn snapshot_is_sorted_by_ip() {
        let mut table = HostTable::new();
        for last in [200, 3, 45, 1] {
            table.discover(ip(last), subnet(), DiscoveryMethod::Icmp, None);
        }
        let order: Vec<Ipv4Addr> = table.snapshot().iter().map(HostRecord::ip).collect();
        assert_eq!(order, vec![ip(1), ip(3), ip(45), ip(200)]);
    }
}

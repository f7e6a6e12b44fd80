//! # LAN Interface Selection
//!
//! ARP sweeps go out of exactly one datalink interface. Unless the user names one
//! with `--interface`, the best candidate is picked: up, physical, broadcast
//! capable, not point-to-point, with a MAC and a private IPv4 address. Wired
//! interfaces win over wireless ones.

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use pnet::util::MacAddr;
use tracing::debug;

#[cfg(target_os = "macos")]
use macos_impl::{is_physical, is_wireless};
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use fallback_impl::{is_physical, is_wireless};
#[cfg(target_os = "linux")]
use linux_impl::{is_physical, is_wireless};

use crate::error::ScanError;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    IsDown,
    /// Loopback, virtual bridges and other interfaces without a device behind them.
    NotPhysical,
    NoMacAddress,
    /// ARP requests are broadcast, so the link must support it.
    NotBroadcast,
    /// VPN style links have nobody to answer ARP.
    IsPointToPoint,
    NoPrivateIpv4,
}

/// Identity an ARP request is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkIdentity {
    pub mac: MacAddr,
    pub ipv4: Ipv4Network,
}

pub trait InterfaceExt {
    fn ipv4_nets(&self) -> Vec<Ipv4Network>;
    /// First private IPv4 network configured on the interface.
    fn lan_ipv4(&self) -> Option<Ipv4Network>;
    fn link_identity(&self) -> Option<LinkIdentity>;
}

impl InterfaceExt for NetworkInterface {
    fn ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| match ip {
                IpNetwork::V4(v4) => Some(*v4),
                IpNetwork::V6(_) => None,
            })
            .collect()
    }

    fn lan_ipv4(&self) -> Option<Ipv4Network> {
        self.ipv4_nets().into_iter().find(|net| net.ip().is_private())
    }

    fn link_identity(&self) -> Option<LinkIdentity> {
        Some(LinkIdentity {
            mac: self.mac?,
            ipv4: self.lan_ipv4()?,
        })
    }
}

/// Picks the interface ARP sweeps run on.
///
/// With `name` set, that interface is used as long as it has a MAC and an IPv4
/// address; the physical/wired heuristics are skipped.
pub fn select_interface(name: Option<&str>) -> Result<NetworkInterface, ScanError> {
    select_from(pnet::datalink::interfaces(), name, is_physical, is_wired)
}

fn select_from(
    interfaces: Vec<NetworkInterface>,
    name: Option<&str>,
    is_physical: impl Fn(&NetworkInterface) -> bool,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Result<NetworkInterface, ScanError> {
    if let Some(name) = name {
        let interface = interfaces
            .into_iter()
            .find(|i| i.name == name)
            .ok_or_else(|| unavailable(format!("no interface named '{name}'")))?;
        if interface.mac.is_none() || interface.ipv4_nets().is_empty() {
            return Err(unavailable(format!(
                "interface '{name}' has no MAC or IPv4 address"
            )));
        }
        return Ok(interface);
    }

    let candidates: Vec<NetworkInterface> = interfaces
        .into_iter()
        .filter(|interface| match is_viable_lan_interface(interface, &is_physical) {
            Ok(()) => true,
            Err(reason) => {
                debug!("skipping interface {}: {reason:?}", interface.name);
                false
            }
        })
        .collect();

    select_best_lan_interface(candidates, is_wired)
        .ok_or_else(|| unavailable("no interface available for LAN discovery".to_string()))
}

fn unavailable(reason: String) -> ScanError {
    ScanError::TransportUnavailable {
        layer: "datalink",
        reason,
    }
}

fn is_viable_lan_interface(
    interface: &NetworkInterface,
    is_physical: impl Fn(&NetworkInterface) -> bool,
) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() || !is_physical(interface) {
        return Err(ViabilityError::NotPhysical);
    }
    if interface.mac.is_none() {
        return Err(ViabilityError::NoMacAddress);
    }
    if !interface.is_broadcast() {
        return Err(ViabilityError::NotBroadcast);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    if interface.lan_ipv4().is_none() {
        return Err(ViabilityError::NoPrivateIpv4);
    }
    Ok(())
}

fn select_best_lan_interface(
    interfaces: Vec<NetworkInterface>,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Option<NetworkInterface> {
    let wired = interfaces.iter().position(&is_wired).unwrap_or(0);
    interfaces.into_iter().nth(wired)
}

fn is_wired(interface: &NetworkInterface) -> bool {
    is_physical(interface) && !is_wireless(interface)
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/device", interface.name)).exists()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/wireless", interface.name)).exists()
    }
}

#[cfg(target_os = "macos")]
mod macos_impl {
    use super::*;
    use std::collections::HashSet;
    use std::process::Command;
    use std::sync::OnceLock;

    struct HardwarePorts {
        physical: HashSet<String>,
        wireless: HashSet<String>,
    }

    /// `networksetup` is slow, so it runs once per process.
    fn hardware_ports() -> &'static HardwarePorts {
        static PORTS: OnceLock<HardwarePorts> = OnceLock::new();

        PORTS.get_or_init(|| {
            let mut physical = HashSet::new();
            if let Ok(output) = Command::new("networksetup")
                .arg("-listallhardwareports")
                .output()
            {
                let stdout = String::from_utf8_lossy(&output.stdout);
                physical.extend(
                    stdout
                        .lines()
                        .filter_map(|line| line.strip_prefix("Device: "))
                        .map(|device| device.trim().to_string()),
                );
            }

            let wireless = physical
                .iter()
                .filter(|device| {
                    Command::new("networksetup")
                        .arg("-getairportnetwork")
                        .arg(device.as_str())
                        .output()
                        .map(|out| out.status.success())
                        .unwrap_or(false)
                })
                .cloned()
                .collect();

            HardwarePorts { physical, wireless }
        })
    }

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        hardware_ports().physical.contains(&interface.name)
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        hardware_ports().wireless.contains(&interface.name)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod fallback_impl {
    use super::*;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        !interface.is_loopback()
    }

    pub fn is_wireless(_interface: &NetworkInterface) -> bool {
        false
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

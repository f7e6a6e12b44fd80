use std::collections::BTreeSet;

use crate::terminal::colors;
use colored::*;
use lanscout_common::host::HostRecord;

pub type Detail = (String, ColoredString);

/// The tree rows printed under a host, in report column order.
pub fn host_details(host: &HostRecord) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("IPv4".to_string(), host.ip().to_string().color(colors::IPV4_ADDR)),
        mac_to_detail(host),
    ];

    if let Some(vendor) = &host.vendor {
        details.push(("Vendor".to_string(), vendor.as_str().color(colors::VENDOR)));
    }
    if host.os_description.is_some() {
        details.push(("OS".to_string(), host.os_display().color(colors::TEXT_DEFAULT)));
    }
    if !host.open_ports.is_empty() {
        details.push(("Ports".to_string(), ports_to_string(&host.open_ports).color(colors::PORT)));
    }
    details.push(("Via".to_string(), host.discovered_via.to_string().color(colors::SEPARATOR)));
    details
}

fn mac_to_detail(host: &HostRecord) -> Detail {
    let value = match host.mac {
        Some(mac) => mac.to_string().color(colors::MAC_ADDR),
        None => host.mac_display().color(colors::UNKNOWN),
    };
    ("MAC".to_string(), value)
}

pub fn ports_to_string(ports: &BTreeSet<u16>) -> String {
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

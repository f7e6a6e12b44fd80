use crate::terminal::{colors, format::Detail, print};
use colored::*;
use lanscout_common::network::interface::InterfaceExt;
use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::Ipv4Network;

pub fn ipv4_nets_to_details(nets: &[Ipv4Network]) -> Vec<Detail> {
    nets.iter()
        .map(|net| {
            let address: ColoredString = net.ip().to_string().color(colors::IPV4_ADDR);
            let prefix: ColoredString = net.prefix().to_string().color(colors::IPV4_PREFIX);
            let result: ColoredString = format!("{address}/{prefix}").color(colors::SEPARATOR);
            ("IPv4".to_string(), result)
        })
        .collect()
}

/// Prints the interface a scan runs on.
pub fn print_interface(interface: &NetworkInterface, idx: usize) {
    print::tree_head(idx, &interface.name);
    let mut key_value_pair: Vec<Detail> = ipv4_nets_to_details(&interface.ipv4_nets());
    if let Some(mac_addr) = interface.mac {
        key_value_pair.push((
            "MAC".to_string(),
            mac_addr.to_string().color(colors::MAC_ADDR),
        ));
    }
    print::as_tree_one_level(key_value_pair);
}

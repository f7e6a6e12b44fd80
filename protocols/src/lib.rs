//! Frame builders and parsers for the layer-2 probes.

pub mod arp;
pub mod ethernet;

pub const MIN_ETH_FRAME_NO_FCS: usize = 60;
pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;

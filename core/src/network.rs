pub mod arp;
pub mod channel;
pub mod dns;
pub mod icmp;
pub mod snmp;
pub mod tcp;

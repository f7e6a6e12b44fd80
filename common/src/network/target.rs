//! # Manual Scan Target
//!
//! Parses what the user typed into the manual target field.
//!
//! Accepted forms:
//! * A single IPv4 address (`192.168.1.5`).
//! * A CIDR block (`192.168.1.0/24`, host bits are allowed and dropped).
//! * A range of two endpoints, each an address or a CIDR (`10.0.0.0/24-10.0.2.0/24`).
//!   The range walks /24 networks from the first endpoint to the second.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::ScanError;
use crate::network::subnet::Subnet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualTarget {
    /// Probe exactly one address.
    Host { addr: Ipv4Addr },
    /// Probe every host of one network.
    Cidr { subnet: Subnet },
    /// Walk /24 networks from `start` through `end`, both network addresses.
    Range { start: Ipv4Addr, end: Ipv4Addr },
}

impl ManualTarget {
    /// Whether each generated subnet should pass the liveness check first.
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range { .. })
    }
}

impl FromStr for ManualTarget {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();

        if compact.is_empty() {
            return Err(ScanError::invalid_target(s, "target is empty"));
        }

        if let Some((start_str, end_str)) = compact.split_once('-') {
            let start = parse_endpoint(start_str, s)?;
            let end = parse_endpoint(end_str, s)?;
            if end < start {
                return Err(ScanError::invalid_target(
                    s,
                    format!("range end {end} comes before start {start}"),
                ));
            }
            return Ok(Self::Range { start, end });
        }

        if compact.contains('/') {
            let subnet = parse_cidr(&compact, s)?;
            return Ok(Self::Cidr { subnet });
        }

        let addr = parse_addr(&compact, s)?;
        Ok(Self::Host { addr })
    }
}

impl fmt::Display for ManualTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host { addr } => write!(f, "{addr}"),
            Self::Cidr { subnet } => write!(f, "{subnet}"),
            Self::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

/// An endpoint resolves to its network address (an address alone is its own /32).
fn parse_endpoint(part: &str, original: &str) -> Result<Ipv4Addr, ScanError> {
    if part.contains('/') {
        Ok(parse_cidr(part, original)?.network())
    } else {
        parse_addr(part, original)
    }
}

fn parse_cidr(part: &str, original: &str) -> Result<Subnet, ScanError> {
    let (ip_str, prefix_str) = part
        .split_once('/')
        .ok_or_else(|| ScanError::invalid_target(original, "missing '/' in CIDR"))?;

    let addr = parse_addr(ip_str, original)?;
    let prefix = prefix_str.parse::<u8>().map_err(|e| {
        ScanError::invalid_target(original, format!("invalid prefix '{prefix_str}': {e}"))
    })?;

    Subnet::new(addr, prefix).map_err(|_| {
        ScanError::invalid_target(original, format!("prefix /{prefix} is larger than 32"))
    })
}

fn parse_addr(part: &str, original: &str) -> Result<Ipv4Addr, ScanError> {
    part.parse::<Ipv4Addr>().map_err(|e| {
        ScanError::invalid_target(original, format!("'{part}' is not an IPv4 address: {e}"))
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

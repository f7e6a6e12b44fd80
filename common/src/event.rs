//! # Scan Events
//!
//! The ordered stream a running scan reports through. Every event carries a
//! [`Category`] so a front end can colour or filter it without matching on each
//! variant, and a `Display` impl that renders the log line.

use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use pnet::util::MacAddr;

use crate::host::DiscoveryMethod;
use crate::network::subnet::Subnet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Probing,
    Reachable,
    Unreachable,
    Error,
    Info,
}

/// Which worker pool a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    HostSweep,
    PortSweep,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostSweep => write!(f, "host sweep"),
            Self::PortSweep => write!(f, "port sweep"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Started {
        mode: String,
        subnets: usize,
    },
    SubnetProbing {
        subnet: Subnet,
        index: usize,
        total: usize,
    },
    SubnetReachable {
        subnet: Subnet,
        replies: usize,
    },
    SubnetUnreachable {
        subnet: Subnet,
        replies: usize,
    },
    HostDiscovered {
        ip: Ipv4Addr,
        mac: Option<MacAddr>,
        method: DiscoveryMethod,
    },
    HostnameResolved {
        ip: Ipv4Addr,
        hostname: String,
    },
    OsDetected {
        ip: Ipv4Addr,
        description: String,
    },
    /// The host did not answer the SNMP query.
    SnmpSilent {
        ip: Ipv4Addr,
    },
    PortOpen {
        ip: Ipv4Addr,
        port: u16,
    },
    Progress {
        stage: Stage,
        done: usize,
        total: usize,
    },
    EchoReply {
        ip: Ipv4Addr,
        seq: u32,
        rtt: Duration,
    },
    EchoTimeout {
        ip: Ipv4Addr,
        seq: u32,
    },
    /// A stage failed in a way the user should know about; the scan continues.
    Failure {
        context: String,
        reason: String,
    },
    LiveSubnetLimit {
        limit: usize,
    },
    Cancelled,
    Finished {
        hosts: usize,
        elapsed: Duration,
    },
}

impl ScanEvent {
    pub fn category(&self) -> Category {
        match self {
            Self::SubnetProbing { .. } | Self::Progress { .. } => Category::Probing,
            Self::SubnetReachable { .. }
            | Self::HostDiscovered { .. }
            | Self::HostnameResolved { .. }
            | Self::OsDetected { .. }
            | Self::PortOpen { .. }
            | Self::EchoReply { .. } => Category::Reachable,
            Self::SubnetUnreachable { .. } | Self::SnmpSilent { .. } | Self::EchoTimeout { .. } => {
                Category::Unreachable
            }
            Self::Failure { .. } => Category::Error,
            Self::Started { .. }
            | Self::LiveSubnetLimit { .. }
            | Self::Cancelled
            | Self::Finished { .. } => Category::Info,
        }
    }

    pub fn failure(context: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Failure {
            context: context.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { mode, subnets } => write!(f, "Starting {mode} over {subnets} subnet(s)"),
            Self::SubnetProbing { subnet, index, total } => {
                write!(f, "Probing {subnet} ({}/{total})", index + 1)
            }
            Self::SubnetReachable { subnet, replies } => {
                write!(f, "{subnet} is alive ({replies}/4 samples replied)")
            }
            Self::SubnetUnreachable { subnet, replies } => {
                write!(f, "{subnet} looks empty ({replies}/4 samples replied)")
            }
            Self::HostDiscovered { ip, mac: Some(mac), method } => {
                write!(f, "Found {ip} at {mac} via {method}")
            }
            Self::HostDiscovered { ip, mac: None, method } => write!(f, "Found {ip} via {method}"),
            Self::HostnameResolved { ip, hostname } => write!(f, "{ip} is {hostname}"),
            Self::OsDetected { ip, description } => write!(f, "{ip} runs {description}"),
            Self::SnmpSilent { ip } => write!(f, "No SNMP answer from {ip}"),
            Self::PortOpen { ip, port } => write!(f, "{ip}:{port} is open"),
            Self::Progress { stage, done, total } => write!(f, "{stage}: {done}/{total}"),
            Self::EchoReply { ip, seq, rtt } => {
                write!(f, "Reply from {ip}: seq={seq} time={:.1}ms", rtt.as_secs_f64() * 1000.0)
            }
            Self::EchoTimeout { ip, seq } => write!(f, "No reply from {ip}: seq={seq}"),
            Self::Failure { context, reason } => write!(f, "{context}: {reason}"),
            Self::LiveSubnetLimit { limit } => {
                write!(f, "Reached {limit} live subnets, not probing further")
            }
            Self::Cancelled => write!(f, "Scan stopped by user"),
            Self::Finished { hosts, elapsed } => {
                write!(f, "Scan finished: {hosts} host(s) in {:.2}s", elapsed.as_secs_f64())
            }
        }
    }
}

/// Receives scan events in the order they happen.
///
/// Called from the scan task, so implementations must not block for long.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: ScanEvent);
}

impl<F> EventSink for F
where
    F: Fn(ScanEvent) + Send + Sync,
{
    fn on_event(&self, event: ScanEvent) {
        self(event)
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
    use std::sync::Mutex;

    fn subnet() -> Subnet {
        Subnet::slash24(Ipv4Addr::new(10, 0, 1, 0))
    }

    #[test]
    fn categories_follow_outcome() {
        let ip = Ipv4Addr::new(10, 0, 1, 5);
        assert_eq!(
            ScanEvent::SubnetProbing { subnet: subnet(), index: 0, total: 1 }.category(),
            Category::Probing
        );
        assert_eq!(ScanEvent::SubnetReachable { subnet: subnet(), replies: 2 }.category(), Category::Reachable);
        assert_eq!(ScanEvent::SubnetUnreachable { subnet: subnet(), replies: 0 }.category(), Category::Unreachable);
        assert_eq!(ScanEvent::PortOpen { ip, port: 22 }.category(), Category::Reachable);
        assert_eq!(ScanEvent::failure("snmp", "socket closed").category(), Category::Error);
        assert_eq!(ScanEvent::Cancelled.category(), Category::Info);
    }

    #[test]
    fn log_lines_are_readable() {
        let ip = Ipv4Addr::new(192, 168, 1, 10);
        let found = ScanEvent::HostDiscovered {
            ip,
            mac: Some(MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff)),
            method: DiscoveryMethod::Arp,
        };
        assert_eq!(found.to_string(), "Found 192.168.1.10 at aa:bb:cc:dd:ee:ff via ARP");
        assert_eq!(
            ScanEvent::SubnetProbing { subnet: subnet(), index: 0, total: 526 }.to_string(),
            "Probing 10.0.1.0/24 (1/526)"
        );
        assert_eq!(ScanEvent::PortOpen { ip, port: 22 }.to_string(), "192.168.1.10:22 is open");
    }

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |event: ScanEvent| seen.lock().unwrap().push(event);
        sink.on_event(ScanEvent::Cancelled);
        assert_eq!(seen.lock().unwrap().as_slice(), &[ScanEvent::Cancelled]);
    }
}

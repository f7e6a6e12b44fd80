//! # Scan Configuration
//!
//! Everything a caller decides before a scan starts. The CLI fills these from its
//! arguments; library users start from `Default` and override what they need.

use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::network::subnet::Subnet;
use crate::network::target::ManualTarget;

/// Upper bound for either worker pool.
pub const MAX_WORKERS: usize = 200;
pub const DEFAULT_PORT_WORKERS: usize = 50;
pub const DEFAULT_HOST_WORKERS: usize = 10;
pub const DEFAULT_COMMUNITY: &str = "public";
/// Ports probed by a deep scan.
pub const WELL_KNOWN_PORTS: std::ops::RangeInclusive<u16> = 1..=1023;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimits {
    port_workers: usize,
    host_workers: usize,
}

impl ConcurrencyLimits {
    /// Both limits are clamped to `1..=MAX_WORKERS`.
    pub fn new(port_workers: usize, host_workers: usize) -> Self {
        Self {
            port_workers: port_workers.clamp(1, MAX_WORKERS),
            host_workers: host_workers.clamp(1, MAX_WORKERS),
        }
    }

    pub fn port_workers(&self) -> usize {
        self.port_workers
    }

    pub fn host_workers(&self) -> usize {
        self.host_workers
    }
}

impl Default for ConcurrencyLimits {
    fn default() -> Self {
        Self::new(DEFAULT_PORT_WORKERS, DEFAULT_HOST_WORKERS)
    }
}

/// Fixed per-probe bounds. No probe is ever retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    /// Echo wait during the deep ICMP host sweep and ping-only mode.
    pub ping: Duration,
    /// How long ARP replies are collected after the requests went out.
    pub arp_window: Duration,
    pub tcp_connect: Duration,
    pub snmp: Duration,
    pub dns: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            ping: Duration::from_secs(1),
            arp_window: Duration::from_secs(2),
            tcp_connect: Duration::from_millis(300),
            snmp: Duration::from_secs(1),
            dns: Duration::from_secs(2),
        }
    }
}

/// Thresholds and timeouts of the four-sample subnet liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessPolicy {
    pub permissive_threshold: usize,
    /// Used when rogue subnets should be ignored.
    pub strict_threshold: usize,
    pub timeout: Duration,
    pub deep_timeout: Duration,
}

impl LivenessPolicy {
    pub fn threshold(&self, strict: bool) -> usize {
        if strict {
            self.strict_threshold
        } else {
            self.permissive_threshold
        }
    }

    pub fn timeout(&self, deep: bool) -> Duration {
        if deep { self.deep_timeout } else { self.timeout }
    }
}

impl Default for LivenessPolicy {
    fn default() -> Self {
        Self {
            permissive_threshold: 1,
            strict_threshold: 2,
            timeout: Duration::from_millis(300),
            deep_timeout: Duration::from_millis(600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// ICMP host sweep, SNMP, port scan and the longer liveness timeout.
    pub deep: bool,
    /// Require two liveness replies instead of one.
    pub strict: bool,
    pub limits: ConcurrencyLimits,
    pub community: String,
    pub resolve_hostnames: bool,
    /// Stop walking subnets after this many were found alive.
    pub max_live_subnets: Option<usize>,
    pub timeouts: ProbeTimeouts,
    pub liveness: LivenessPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            deep: false,
            strict: false,
            limits: ConcurrencyLimits::default(),
            community: DEFAULT_COMMUNITY.to_string(),
            resolve_hostnames: true,
            max_live_subnets: None,
            timeouts: ProbeTimeouts::default(),
            liveness: LivenessPolicy::default(),
        }
    }
}

impl ScanConfig {
    pub fn liveness_threshold(&self) -> usize {
        self.liveness.threshold(self.strict)
    }

    pub fn liveness_timeout(&self) -> Duration {
        self.liveness.timeout(self.deep)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMode {
    /// The 526 common private /24s.
    Quick,
    /// Every /24 of the RFC1918 space.
    FullSweep,
    Manual(ManualTarget),
    /// The /24 around this machine's own LAN address, probed without the liveness check.
    Local { addr: Ipv4Addr },
    /// Echo one address repeatedly until stopped or `count` echoes were sent.
    PingOnly {
        target: Ipv4Addr,
        count: Option<u32>,
        interval: Duration,
    },
}

impl ScanMode {
    pub fn local(addr: Ipv4Addr) -> Self {
        Self::Local { addr }
    }

    pub fn ping(target: Ipv4Addr, count: Option<u32>) -> Self {
        Self::PingOnly {
            target,
            count,
            interval: Duration::from_secs(1),
        }
    }

    /// Whether every subnet must pass the liveness check before its hosts are probed.
    pub fn gates_on_liveness(&self) -> bool {
        match self {
            Self::Quick | Self::FullSweep => true,
            Self::Manual(target) => target.is_range(),
            Self::Local { .. } | Self::PingOnly { .. } => false,
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quick => write!(f, "quick scan"),
            Self::FullSweep => write!(f, "full sweep"),
            Self::Manual(target) => write!(f, "manual scan of {target}"),
            Self::Local { addr } => write!(f, "local scan of {}", Subnet::slash24(*addr)),
            Self::PingOnly { target, .. } => write!(f, "ping test of {target}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub mode: ScanMode,
    pub config: ScanConfig,
    /// The caller acknowledged the cost of a full sweep.
    pub confirm_full_sweep: bool,
}

impl ScanRequest {
    pub fn new(mode: ScanMode, config: ScanConfig) -> Self {
        Self {
            mode,
            config,
            confirm_full_sweep: false,
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.confirm_full_sweep = true;
        self
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

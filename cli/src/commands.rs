pub mod ping;
pub mod scan;

use std::net::Ipv4Addr;

use clap::{ArgAction, Args, Parser, Subcommand};
use lanscout_common::config::{
    ConcurrencyLimits, DEFAULT_COMMUNITY, DEFAULT_HOST_WORKERS, DEFAULT_PORT_WORKERS, MAX_WORKERS, ScanConfig,
};
use lanscout_common::network::target::ManualTarget;

#[derive(Parser)]
#[command(name = "lanscout")]
#[command(version, about = "Finds live subnets and hosts on private networks.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub scan: ScanArgs,

    /// Less output: -q hides headers, -qq also hides the per-host details
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the 526 most common private /24 subnets
    #[command(alias = "q")]
    Quick,
    /// Scan only the /24 this machine sits on
    #[command(alias = "l")]
    Local,
    /// Scan every /24 of 10/8, 172.16/12 and 192.168/16
    #[command(alias = "s")]
    Sweep {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Scan an address, a CIDR block or a range such as 10.0.0.0/24-10.0.9.0/24
    #[command(alias = "m")]
    Manual { target: ManualTarget },
    /// Echo one host once per second
    #[command(alias = "p")]
    Ping {
        host: Ipv4Addr,
        /// Stop after this many echoes
        #[arg(short, long)]
        count: Option<u32>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// ICMP host sweep, SNMP query and port scan of every host found
    #[arg(short, long, global = true)]
    pub deep: bool,

    /// A subnet needs two of four liveness replies instead of one
    #[arg(long, global = true)]
    pub strict: bool,

    #[arg(long, default_value_t = DEFAULT_PORT_WORKERS, value_parser = workers, global = true)]
    pub port_workers: usize,

    #[arg(long, default_value_t = DEFAULT_HOST_WORKERS, value_parser = workers, global = true)]
    pub host_workers: usize,

    /// SNMP community used by deep scans
    #[arg(long, default_value = DEFAULT_COMMUNITY, global = true)]
    pub community: String,

    /// Do not resolve hostnames
    #[arg(long, global = true)]
    pub no_dns: bool,

    /// Stop after this many subnets were found alive
    #[arg(long, global = true)]
    pub max_live_subnets: Option<usize>,

    /// Interface to scan from; picked automatically when omitted
    #[arg(short, long, global = true)]
    pub interface: Option<String>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl ScanArgs {
    pub fn to_config(&self) -> ScanConfig {
        ScanConfig {
            deep: self.deep,
            strict: self.strict,
            limits: ConcurrencyLimits::new(self.port_workers, self.host_workers),
            community: self.community.clone(),
            resolve_hostnames: !self.no_dns,
            max_live_subnets: self.max_live_subnets,
            ..ScanConfig::default()
        }
    }
}

fn workers(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (1..=MAX_WORKERS).contains(&n) {
        Ok(n)
    } else {
        Err(format!("must be between 1 and {MAX_WORKERS}"))
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

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::*;
use is_root::is_root;
use pnet::datalink::NetworkInterface;
use tracing::{info, warn};

use crate::commands::ScanArgs;
use crate::terminal::{colors, format, input, network_fmt, print, sink::TerminalSink, spinner};
use crate::{mprint, success};
use lanscout_common::ScanError;
use lanscout_common::config::{ScanMode, ScanRequest};
use lanscout_common::host::HostRecord;
use lanscout_common::network::interface::{self, InterfaceExt};
use lanscout_core::vendors::MacOuiRepo;
use lanscout_core::{NetProber, ScanHandle, ScanReport, Scanner};

pub async fn scan(mode: ScanMode, args: &ScanArgs, confirmed: bool, q_level: u8) -> anyhow::Result<()> {
    let intf = pick_interface(args, q_level)?;
    run(mode, &intf, args, confirmed, q_level).await
}

/// Scans the /24 around the selected interface's private address.
pub async fn local(args: &ScanArgs, q_level: u8) -> anyhow::Result<()> {
    let intf = pick_interface(args, q_level)?;
    let lan = intf
        .lan_ipv4()
        .with_context(|| format!("{} has no private IPv4 address", intf.name))?;
    run(ScanMode::local(lan.ip()), &intf, args, false, q_level).await
}

async fn run(
    mode: ScanMode,
    intf: &NetworkInterface,
    args: &ScanArgs,
    confirmed: bool,
    q_level: u8,
) -> anyhow::Result<()> {
    let sink = Arc::new(TerminalSink::default());
    let scanner = open_scanner(intf)?;

    let mut request = ScanRequest::new(mode, args.to_config());
    request.confirm_full_sweep = confirmed;
    print_parameters(&request, q_level);

    let handle = match scanner.start(request.clone(), sink.clone()) {
        Err(ScanError::ConfirmationRequired { subnets }) => {
            if !input::confirm_full_sweep(subnets)? {
                info!("Full sweep cancelled");
                return Ok(());
            }
            scanner.start(request.confirmed(), sink)?
        }
        other => other?,
    };

    let report = drive(handle).await?;
    scan_ends(&report, q_level);
    Ok(())
}

/// Picks the interface ARP sweeps run on and shows it.
pub(crate) fn pick_interface(args: &ScanArgs, q_level: u8) -> anyhow::Result<NetworkInterface> {
    if !is_root() {
        warn!("Not running as root, raw ARP and ICMP access will most likely be refused");
    }

    let intf = interface::select_interface(args.interface.as_deref())?;
    print::header("interface", q_level);
    if q_level == 0 {
        network_fmt::print_interface(&intf, 0);
    }
    Ok(intf)
}

/// Opens the raw transports on `intf` and wraps them in a scanner.
pub(crate) fn open_scanner(intf: &NetworkInterface) -> anyhow::Result<Scanner> {
    let prober = NetProber::open(Some(&intf.name)).context("could not open the raw network transports")?;
    Ok(Scanner::new(Arc::new(prober), Arc::new(MacOuiRepo)))
}

/// Waits for the scan while listening for the stop keys and Ctrl-C.
pub(crate) async fn drive(handle: ScanHandle) -> anyhow::Result<ScanReport> {
    let keys = input::StopKeys::listen(handle.token());
    let token = handle.token();

    let stop_on_signal = tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::signal::ctrl_c() => token.cancel(),
        }
    });

    let report = handle.wait().await;
    stop_on_signal.abort();
    drop(keys);
    spinner::get_spinner().finish_and_clear();

    Ok(report?)
}

fn print_parameters(request: &ScanRequest, q_level: u8) {
    if q_level > 0 {
        return;
    }
    let config = &request.config;
    print::header("parameters", q_level);
    print::set_key_width(["Mode", "Deep", "Liveness", "Workers", "Community"]);
    print::aligned_line("Mode", request.mode.to_string());
    print::aligned_line("Deep", if config.deep { "yes" } else { "no" });
    print::aligned_line(
        "Liveness",
        format!("{} of 4 replies", config.liveness_threshold()),
    );
    print::aligned_line(
        "Workers",
        format!("{} port / {} host", config.limits.port_workers(), config.limits.host_workers()),
    );
    if config.deep {
        print::aligned_line("Community", config.community.as_str());
    }
}

fn scan_ends(report: &ScanReport, q_level: u8) {
    if report.cancelled {
        warn!(
            "Stopped after {} of {} subnets",
            report.subnets_probed, report.subnets_total
        );
    }

    if report.hosts.is_empty() {
        no_hosts_found(q_level);
        return;
    }

    if q_level > 0 {
        mprint!();
    }

    print::header("Network Discovery", q_level);
    print_hosts(&report.hosts, q_level);
    print_summary(report, q_level);
}

fn no_hosts_found(q_level: u8) {
    print::header("ZERO HOSTS DETECTED", q_level);
    if q_level == 0 {
        print::no_results();
    }
}

fn print_hosts(hosts: &[HostRecord], q_level: u8) {
    if q_level >= 2 {
        return;
    }
    for (idx, host) in hosts.iter().enumerate() {
        print::tree_head(idx, &host.hostname_display());
        print::as_tree_one_level(format::host_details(host));
        if idx + 1 != hosts.len() {
            mprint!();
        }
    }
}

fn print_summary(report: &ScanReport, q_level: u8) {
    let active_hosts: ColoredString = format!("{} active hosts", report.hosts.len()).bold().green();
    let live: ColoredString = format!("{} live subnets", report.live_subnets).bold().green();
    let total_time: ColoredString = seconds(report.elapsed).bold().yellow();
    let output: &ColoredString =
        &format!("Discovery Complete: {active_hosts} in {live}, {total_time}").color(colors::TEXT_DEFAULT);

    match q_level {
        0 => {
            print::fat_separator();
            print::centerln(output);
        }
        _ => {
            mprint!();
            success!("{}", output)
        }
    }
}

fn seconds(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

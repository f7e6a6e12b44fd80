use std::net::Ipv4Addr;
use std::sync::Arc;

use colored::*;

use crate::commands::ScanArgs;
use crate::commands::scan::{drive, open_scanner, pick_interface};
use crate::terminal::{colors, print, sink::TerminalSink};
use crate::{mprint, success};
use lanscout_common::config::{ScanMode, ScanRequest};

pub async fn ping(host: Ipv4Addr, count: Option<u32>, args: &ScanArgs, q_level: u8) -> anyhow::Result<()> {
    let sink = Arc::new(TerminalSink::default());
    let scanner = open_scanner(&pick_interface(args, q_level)?)?;

    print::header(&format!("pinging {host}"), q_level);
    let request = ScanRequest::new(ScanMode::ping(host, count), args.to_config());
    let handle = scanner.start(request, sink.clone())?;
    let report = drive(handle).await?;

    let (sent, received) = sink.echo_counts();
    let name = report
        .hosts
        .first()
        .map(|h| h.hostname_display())
        .unwrap_or_else(|| host.to_string());

    mprint!();
    let output = format!(
        "{}: {} sent, {} received, {} loss",
        name.color(colors::PRIMARY),
        sent,
        received.to_string().bold().green(),
        loss(sent, received).bold().yellow()
    );
    success!("{}", output);
    Ok(())
}

fn loss(sent: u32, received: u32) -> String {
    if sent == 0 {
        return "0%".to_string();
    }
    let lost = sent.saturating_sub(received);
    format!("{:.0}%", f64::from(lost) * 100.0 / f64::from(sent))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

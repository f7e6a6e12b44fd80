use std::collections::BTreeSet;
use std::sync::Arc;

use lanscout_common::config::{ScanConfig, ScanMode, ScanRequest};
use lanscout_common::event::{ScanEvent, Stage};
use lanscout_common::host::DiscoveryMethod;
use lanscout_common::network::subnet::Subnet;
use lanscout_core::ScanReport;
use lanscout_core::sink::ChannelSink;
use pnet::util::MacAddr;

use crate::support::{Recorder, SimHost, SimulatedNetwork, ip, scanner};

const PRINTER_MAC: MacAddr = MacAddr(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff);
const ROUTER_MAC: MacAddr = MacAddr(0x02, 0x00, 0x00, 0x00, 0x00, 0x01);

fn deep() -> ScanConfig {
    ScanConfig {
        deep: true,
        ..ScanConfig::default()
    }
}

fn manual(target: &str) -> ScanMode {
    ScanMode::Manual(target.parse().unwrap())
}

async fn run(
    network: SimulatedNetwork,
    mode: ScanMode,
    config: ScanConfig,
) -> (ScanReport, Arc<SimulatedNetwork>, Arc<Recorder>) {
    let (scanner, network) = scanner(network);
    let recorder = Recorder::new();
    let handle = scanner
        .start(ScanRequest::new(mode, config), recorder.clone())
        .unwrap();
    (handle.wait().await.unwrap(), network, recorder)
}

fn home_network() -> SimulatedNetwork {
    SimulatedNetwork::new()
        .with_host(ip(192, 168, 1, 1), SimHost::arp(ROUTER_MAC).with_echo())
        .with_host(ip(192, 168, 1, 10), SimHost::arp(PRINTER_MAC))
        .with_host(ip(10, 0, 5, 1), SimHost::arp(MacAddr(0x02, 0, 0, 0, 5, 1)).with_echo())
}

#[tokio::test]
async fn quick_scan_finds_hosts_on_live_subnets() {
    let (report, network, _) = run(home_network(), ScanMode::Quick, ScanConfig::default()).await;

    let found: Vec<_> = report.hosts.iter().map(|h| h.ip()).collect();
    assert_eq!(found, vec![ip(10, 0, 5, 1), ip(192, 168, 1, 1), ip(192, 168, 1, 10)]);
    assert_eq!(report.live_subnets, 2);
    assert_eq!(report.subnets_probed, 526);
    assert_eq!(report.subnets_total, 526);
    assert!(!report.cancelled);

    assert_eq!(
        network.log().swept,
        vec![Subnet::slash24(ip(10, 0, 5, 0)), Subnet::slash24(ip(192, 168, 1, 0))]
    );
    // no ICMP host sweep outside deep mode
    assert_eq!(network.log().pinged.len(), 526 * 4);
}

#[tokio::test]
async fn arp_and_icmp_sightings_merge_into_one_record() {
    let network = SimulatedNetwork::new()
        .with_host(ip(192, 168, 1, 10), SimHost::arp(PRINTER_MAC).with_echo())
        .with_host(ip(192, 168, 1, 20), SimHost::echo());
    let (report, _, recorder) = run(network, manual("192.168.1.0/24"), deep()).await;

    assert_eq!(report.hosts.len(), 2);
    let printer = &report.hosts[0];
    assert_eq!(printer.ip(), ip(192, 168, 1, 10));
    assert_eq!(printer.mac_display(), "aa:bb:cc:dd:ee:ff");
    assert_eq!(printer.discovered_via, DiscoveryMethod::Arp);

    let quiet_host = &report.hosts[1];
    assert_eq!(quiet_host.mac_display(), "unknown");
    assert_eq!(quiet_host.discovered_via, DiscoveryMethod::Icmp);

    let printer_sightings =
        recorder.count(|e| matches!(e, ScanEvent::HostDiscovered { ip, .. } if *ip == printer.ip()));
    assert_eq!(printer_sightings, 1);
}

#[tokio::test]
async fn port_sweep_reports_exactly_the_open_ports() {
    let server = ip(10, 1, 2, 3);
    let network = SimulatedNetwork::new().with_host(server, SimHost::arp(ROUTER_MAC).with_ports([22, 8080]));
    let (report, network, recorder) = run(network, manual("10.1.2.3"), deep()).await;

    assert_eq!(report.hosts.len(), 1);
    assert_eq!(report.hosts[0].open_ports, BTreeSet::from([22]));
    assert_eq!(network.log().connects, 1023);
    assert_eq!(recorder.count(|e| matches!(e, ScanEvent::PortOpen { .. })), 1);
}

#[tokio::test]
async fn deep_scan_fills_name_and_os() {
    let nas = ip(192, 168, 8, 30);
    let network = SimulatedNetwork::new().with_host(
        nas,
        SimHost::arp(PRINTER_MAC)
            .with_hostname("nas.lan")
            .with_sys_descr("Linux nas 5.10.0 x86_64"),
    );
    let (report, _, recorder) = run(network, manual("192.168.8.0/24"), deep()).await;

    let host = &report.hosts[0];
    assert_eq!(host.hostname_display(), "nas.lan");
    assert_eq!(host.os_display(), "Linux nas 5.10.0 x86_64");
    assert_eq!(recorder.count(|e| matches!(e, ScanEvent::OsDetected { .. })), 1);
}

#[tokio::test]
async fn quick_scan_leaves_os_and_ports_empty() {
    let nas = ip(192, 168, 8, 30);
    let network = SimulatedNetwork::new().with_host(
        nas,
        SimHost::arp(PRINTER_MAC).with_sys_descr("Linux").with_ports([22]),
    );
    let (report, network, _) = run(network, manual("192.168.8.0/24"), ScanConfig::default()).await;

    assert_eq!(report.hosts[0].os_display(), "");
    assert!(report.hosts[0].open_ports.is_empty());
    assert_eq!(network.log().connects, 0);
}

#[tokio::test]
async fn strict_mode_needs_two_samples() {
    let network = || SimulatedNetwork::new().with_host(ip(10, 0, 0, 1), SimHost::arp(ROUTER_MAC).with_echo());
    let range = || manual("10.0.0.0/24-10.0.0.0/24");

    let (permissive, _, _) = run(network(), range(), ScanConfig::default()).await;
    assert_eq!(permissive.live_subnets, 1);
    assert_eq!(permissive.hosts.len(), 1);

    let strict = ScanConfig {
        strict: true,
        ..ScanConfig::default()
    };
    let (report, network, recorder) = run(network(), range(), strict).await;
    assert_eq!(report.live_subnets, 0);
    assert!(report.hosts.is_empty());
    assert!(network.log().swept.is_empty());
    assert!(recorder.events().contains(&ScanEvent::SubnetUnreachable {
        subnet: Subnet::slash24(ip(10, 0, 0, 0)),
        replies: 1,
    }));
}

#[tokio::test]
async fn manual_range_walks_three_subnets_in_order() {
    let range = manual("10.0.0.0/24-10.0.2.0/24");
    let (report, _, recorder) = run(SimulatedNetwork::new(), range, ScanConfig::default()).await;

    assert_eq!(report.subnets_total, 3);
    let probed: Vec<Subnet> = recorder
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ScanEvent::SubnetProbing { subnet, .. } => Some(subnet),
            _ => None,
        })
        .collect();
    assert_eq!(
        probed,
        vec![
            Subnet::slash24(ip(10, 0, 0, 0)),
            Subnet::slash24(ip(10, 0, 1, 0)),
            Subnet::slash24(ip(10, 0, 2, 0)),
        ]
    );
}

#[tokio::test]
async fn repeated_scans_give_the_same_hosts() {
    let (first, _, _) = run(home_network(), ScanMode::Quick, deep()).await;
    let (second, _, _) = run(home_network(), ScanMode::Quick, deep()).await;
    assert_eq!(first.hosts, second.hosts);
}

#[tokio::test]
async fn live_subnet_limit_stops_the_walk() {
    let network = (0..10).fold(SimulatedNetwork::new(), |net, c| {
        net.with_host(ip(192, 168, c, 1), SimHost::echo())
    });
    let config = ScanConfig {
        max_live_subnets: Some(3),
        ..ScanConfig::default()
    };
    let (report, network, recorder) = run(network, manual("192.168.0.0-192.168.9.0"), config).await;

    assert_eq!(report.live_subnets, 3);
    assert_eq!(network.log().swept.len(), 3);
    assert!(recorder.events().contains(&ScanEvent::LiveSubnetLimit { limit: 3 }));
}

#[tokio::test]
async fn local_scan_probes_only_the_own_slash24() {
    let (report, network, _) = run(home_network(), ScanMode::local(ip(192, 168, 1, 57)), ScanConfig::default()).await;

    let found: Vec<_> = report.hosts.iter().map(|h| h.ip()).collect();
    assert_eq!(found, vec![ip(192, 168, 1, 1), ip(192, 168, 1, 10)]);
    assert_eq!(report.subnets_total, 1);
    assert_eq!(network.log().swept, vec![Subnet::slash24(ip(192, 168, 1, 0))]);
    assert!(network.log().pinged.is_empty());
}

#[tokio::test]
async fn deep_sweep_of_a_wide_prefix_pulls_addresses_on_demand() {
    let network = SimulatedNetwork::new().with_host(ip(10, 0, 0, 9), SimHost::echo());
    let (scanner, network) = scanner(network);
    let recorder = Recorder::new();
    let handle = scanner
        .start(ScanRequest::new(manual("10.0.0.0/8"), deep()), recorder.clone())
        .unwrap();
    recorder.cancel_when(handle.token(), |e| {
        matches!(e, ScanEvent::Progress { stage: Stage::HostSweep, done: 32, .. })
    });

    let report = handle.wait().await.unwrap();
    assert!(report.cancelled);
    assert!(network.log().pinged.len() < 100, "pinged {}", network.log().pinged.len());
    assert_eq!(report.hosts.len(), 1);
    assert_eq!(report.hosts[0].ip(), ip(10, 0, 0, 9));
    assert!(recorder.events().contains(&ScanEvent::Progress {
        stage: Stage::HostSweep,
        done: 16,
        total: 16_777_214,
    }));
}

#[tokio::test]
async fn channel_sink_sees_events_in_pipeline_order() {
    let (scanner, _) = scanner(home_network());
    let (sink, mut rx) = ChannelSink::new();
    let handle = scanner
        .start(ScanRequest::new(manual("192.168.1.0/24-192.168.1.0/24"), ScanConfig::default()), Arc::new(sink))
        .unwrap();
    handle.wait().await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(ScanEvent::Started { .. })));
    assert!(matches!(events.last(), Some(ScanEvent::Finished { hosts: 2, .. })));
    let probing = position(&events, |e| matches!(e, ScanEvent::SubnetProbing { .. }));
    let reachable = position(&events, |e| matches!(e, ScanEvent::SubnetReachable { .. }));
    let discovered = position(&events, |e| matches!(e, ScanEvent::HostDiscovered { .. }));
    assert!(probing < reachable && reachable < discovered);
}

fn position(events: &[ScanEvent], pred: impl Fn(&ScanEvent) -> bool) -> usize {
    events.iter().position(pred).unwrap()
}

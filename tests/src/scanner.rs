use std::time::Duration;

use lanscout_common::ScanError;
use lanscout_common::config::{ScanConfig, ScanMode, ScanRequest};
use lanscout_common::event::ScanEvent;
use lanscout_common::host::DiscoveryMethod;
use lanscout_common::network::target::ManualTarget;

use crate::support::{Recorder, SimHost, SimulatedNetwork, ip, scanner};

fn quick() -> ScanRequest {
    ScanRequest::new(ScanMode::Quick, ScanConfig::default())
}

fn ping(count: Option<u32>) -> ScanRequest {
    ScanRequest::new(
        ScanMode::PingOnly {
            target: ip(192, 168, 1, 1),
            count,
            interval: Duration::from_millis(5),
        },
        ScanConfig::default(),
    )
}

fn router() -> SimulatedNetwork {
    SimulatedNetwork::new().with_host(ip(192, 168, 1, 1), SimHost::echo().with_hostname("router.lan"))
}

#[tokio::test]
async fn second_start_is_rejected_while_running() {
    let (scanner, _) = scanner(SimulatedNetwork::new().with_latency(Duration::from_millis(5)));
    let first = scanner.start(quick(), Recorder::new()).unwrap();

    assert!(matches!(scanner.start(quick(), Recorder::new()), Err(ScanError::AlreadyRunning)));

    first.stop();
    let report = first.wait().await.unwrap();
    assert!(report.cancelled);
    assert!(!scanner.is_running());

    let again = scanner.start(quick(), Recorder::new()).unwrap();
    again.stop();
    again.wait().await.unwrap();
}

#[tokio::test]
async fn full_sweep_without_confirmation_sends_nothing() {
    let (scanner, network) = scanner(SimulatedNetwork::new());
    let request = ScanRequest::new(ScanMode::FullSweep, ScanConfig::default());

    match scanner.start(request, Recorder::new()) {
        Err(ScanError::ConfirmationRequired { subnets }) => assert_eq!(subnets, 69_888),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("full sweep started without confirmation"),
    }
    assert!(!scanner.is_running());
    assert!(network.log().pinged.is_empty());
}

#[tokio::test]
async fn confirmed_full_sweep_starts_and_stops() {
    let (scanner, _) = scanner(SimulatedNetwork::new().with_latency(Duration::from_millis(1)));
    let request = ScanRequest::new(ScanMode::FullSweep, ScanConfig::default()).confirmed();
    let recorder = Recorder::new();
    let handle = scanner.start(request, recorder.clone()).unwrap();
    recorder.cancel_when(handle.token(), |e| matches!(e, ScanEvent::SubnetProbing { index: 1, .. }));

    let report = handle.wait().await.unwrap();
    assert!(report.cancelled);
    assert_eq!(report.subnets_total, 69_888);
    assert_eq!(report.subnets_probed, 2);
}

#[tokio::test]
async fn cancelling_mid_sweep_probes_no_later_subnet() {
    let (scanner, network) = scanner(SimulatedNetwork::new().with_latency(Duration::from_millis(1)));
    let recorder = Recorder::new();
    let handle = scanner.start(quick(), recorder.clone()).unwrap();
    recorder.cancel_when(handle.token(), |e| matches!(e, ScanEvent::SubnetProbing { index: 3, .. }));

    let report = handle.wait().await.unwrap();
    assert!(report.cancelled);
    assert_eq!(report.subnets_probed, 4);

    let last_index = recorder
        .events()
        .iter()
        .filter_map(|e| match e {
            ScanEvent::SubnetProbing { index, .. } => Some(*index),
            _ => None,
        })
        .max();
    assert_eq!(last_index, Some(3));

    // quick order starts at 10.0.1.0/24
    let pinged = network.log().pinged;
    assert!(pinged.iter().all(|addr| addr.octets()[..2] == [10, 0] && addr.octets()[2] <= 4));

    let events = recorder.events();
    assert!(events.contains(&ScanEvent::Cancelled));
    assert!(matches!(events.last(), Some(ScanEvent::Finished { .. })));
}

#[test]
fn invalid_targets_are_rejected_before_scanning() {
    for input in ["", "10.0.0", "10.0.0.0/33", "fe80::1", "10.0.2.0-10.0.1.0", "300.1.1.1", "printer"] {
        match input.parse::<ManualTarget>() {
            Err(e @ ScanError::InvalidTarget { .. }) => assert!(e.is_fatal_setup()),
            other => panic!("{input:?} parsed as {other:?}"),
        }
    }
}

#[tokio::test]
async fn ping_test_honours_count() {
    let (scanner, network) = scanner(router());
    let recorder = Recorder::new();
    let report = scanner.start(ping(Some(3)), recorder.clone()).unwrap().wait().await.unwrap();

    assert_eq!(network.log().pinged.len(), 3);
    assert_eq!(recorder.count(|e| matches!(e, ScanEvent::EchoReply { .. })), 3);
    assert_eq!(report.hosts.len(), 1);
    assert_eq!(report.hosts[0].discovered_via, DiscoveryMethod::Echo);
    assert_eq!(report.hosts[0].hostname_display(), "router.lan");
    assert!(!report.cancelled);
}

#[tokio::test]
async fn ping_test_runs_until_stopped() {
    let (scanner, network) = scanner(router());
    let recorder = Recorder::new();
    let handle = scanner.start(ping(None), recorder.clone()).unwrap();
    recorder.cancel_when(handle.token(), |e| matches!(e, ScanEvent::EchoReply { seq: 2, .. }));

    let report = handle.wait().await.unwrap();
    assert!(report.cancelled);
    assert_eq!(network.log().pinged.len(), 2);
    assert_eq!(report.hosts.len(), 1);
}

#[tokio::test]
async fn silent_ping_target_is_not_reported() {
    let (scanner, _) = scanner(SimulatedNetwork::new());
    let recorder = Recorder::new();
    let report = scanner.start(ping(Some(2)), recorder.clone()).unwrap().wait().await.unwrap();

    assert!(report.hosts.is_empty());
    assert_eq!(recorder.count(|e| matches!(e, ScanEvent::EchoTimeout { .. })), 2);
}

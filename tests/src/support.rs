//! A scripted network and an event recorder for driving whole scans without
//! touching a real interface.

use std::collections::{BTreeSet, HashMap};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lanscout_common::event::{EventSink, ScanEvent};
use lanscout_common::network::subnet::Subnet;
use lanscout_common::vendors::NoVendors;
use lanscout_core::{Prober, Scanner};
use pnet::util::MacAddr;
use tokio_util::sync::CancellationToken;

/// How one simulated address behaves.
#[derive(Debug, Clone, Default)]
pub struct SimHost {
    /// Answers ARP with this MAC.
    pub mac: Option<MacAddr>,
    /// Answers ICMP echo.
    pub echo: bool,
    pub ports: BTreeSet<u16>,
    pub sys_descr: Option<String>,
    pub hostname: Option<String>,
}

impl SimHost {
    pub fn arp(mac: MacAddr) -> Self {
        Self {
            mac: Some(mac),
            ..Self::default()
        }
    }

    pub fn echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    pub fn with_ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.ports.extend(ports);
        self
    }

    pub fn with_sys_descr(mut self, description: &str) -> Self {
        self.sys_descr = Some(description.to_string());
        self
    }

    pub fn with_hostname(mut self, name: &str) -> Self {
        self.hostname = Some(name.to_string());
        self
    }
}

/// Every probe the scan sent, in order.
#[derive(Debug, Clone, Default)]
pub struct ProbeLog {
    pub pinged: Vec<Ipv4Addr>,
    pub swept: Vec<Subnet>,
    pub connects: usize,
}

#[derive(Debug, Default)]
pub struct SimulatedNetwork {
    hosts: HashMap<Ipv4Addr, SimHost>,
    latency: Duration,
    log: Mutex<ProbeLog>,
}

impl SimulatedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, ip: Ipv4Addr, host: SimHost) -> Self {
        self.hosts.insert(ip, host);
        self
    }

    /// Delay added to every echo and ARP sweep.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn log(&self) -> ProbeLog {
        self.log.lock().unwrap().clone()
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl Prober for SimulatedNetwork {
    async fn ping(&self, ip: Ipv4Addr, _timeout: Duration) -> bool {
        self.log.lock().unwrap().pinged.push(ip);
        self.delay().await;
        self.hosts.get(&ip).is_some_and(|h| h.echo)
    }

    async fn arp_sweep(&self, subnet: Subnet, _window: Duration) -> HashMap<Ipv4Addr, MacAddr> {
        self.log.lock().unwrap().swept.push(subnet);
        self.delay().await;
        self.hosts
            .iter()
            .filter(|(ip, _)| subnet.contains(**ip))
            .filter_map(|(ip, host)| host.mac.map(|mac| (*ip, mac)))
            .collect()
    }

    async fn tcp_connect(&self, ip: Ipv4Addr, port: u16, _timeout: Duration) -> bool {
        self.log.lock().unwrap().connects += 1;
        self.hosts.get(&ip).is_some_and(|h| h.ports.contains(&port))
    }

    async fn snmp_get(
        &self,
        ip: Ipv4Addr,
        _oid: &[u64],
        _community: &str,
        _timeout: Duration,
    ) -> anyhow::Result<Option<String>> {
        Ok(self.hosts.get(&ip).and_then(|h| h.sys_descr.clone()))
    }

    async fn reverse_lookup(&self, ip: Ipv4Addr, _timeout: Duration) -> Option<String> {
        self.hosts.get(&ip).and_then(|h| h.hostname.clone())
    }
}

type Condition = Box<dyn Fn(&ScanEvent) -> bool + Send>;

/// Keeps every event and can cancel a scan when a chosen event shows up.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<ScanEvent>>,
    trigger: Mutex<Option<(CancellationToken, Condition)>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn cancel_when(&self, token: CancellationToken, when: impl Fn(&ScanEvent) -> bool + Send + 'static) {
        *self.trigger.lock().unwrap() = Some((token, Box::new(when)));
    }

    pub fn events(&self) -> Vec<ScanEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&ScanEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for Recorder {
    fn on_event(&self, event: ScanEvent) {
        if let Some((token, when)) = self.trigger.lock().unwrap().as_ref() {
            if when(&event) {
                token.cancel();
            }
        }
        self.events.lock().unwrap().push(event);
    }
}

pub fn scanner(network: SimulatedNetwork) -> (Scanner, Arc<SimulatedNetwork>) {
    let network = Arc::new(network);
    (Scanner::new(network.clone(), Arc::new(NoVendors)), network)
}

pub fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}

//! # Scan Session
//!
//! One scan from start to finish. A session owns its host table and walks the
//! subnet space in order:
//!
//! 1. cancellation check and a `SubnetProbing` event,
//! 2. the liveness gate, for sweeps and manual ranges,
//! 3. ARP sweep of the subnet,
//! 4. ICMP sweep of the addresses ARP did not answer for (deep scans only),
//! 5. enrichment of every host found, in IP order.
//!
//! Ping-only sessions skip all of that and echo one address on a fixed interval.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use lanscout_common::config::{ScanConfig, ScanMode, ScanRequest};
use lanscout_common::event::{EventSink, ScanEvent, Stage};
use lanscout_common::host::{DiscoveryMethod, HostRecord};
use lanscout_common::network::space::SubnetSpace;
use lanscout_common::network::subnet::Subnet;
use lanscout_common::vendors::VendorRepository;
use pnet::util::MacAddr;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::aggregate::HostTable;
use crate::enrich::{Enricher, enrichment_order};
use crate::liveness;
use crate::pool::WorkerPool;
use crate::probe::Prober;

const HOST_PROGRESS_EVERY: usize = 16;

/// What a finished (or stopped) scan found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub mode: ScanMode,
    /// Deduplicated and sorted by IP.
    pub hosts: Vec<HostRecord>,
    pub live_subnets: usize,
    pub subnets_probed: usize,
    pub subnets_total: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

pub struct ScanSession {
    mode: ScanMode,
    config: ScanConfig,
    prober: Arc<dyn Prober>,
    vendors: Arc<dyn VendorRepository>,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
    table: HostTable,
    live_subnets: usize,
    subnets_probed: usize,
}

impl ScanSession {
    pub fn new(
        request: ScanRequest,
        prober: Arc<dyn Prober>,
        vendors: Arc<dyn VendorRepository>,
        sink: Arc<dyn EventSink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            mode: request.mode,
            config: request.config,
            prober,
            vendors,
            sink,
            cancel,
            table: HostTable::new(),
            live_subnets: 0,
            subnets_probed: 0,
        }
    }

    pub async fn run(mut self) -> ScanReport {
        let started = Instant::now();

        let subnets_total = match self.mode.clone() {
            ScanMode::PingOnly {
                target,
                count,
                interval,
            } => {
                self.emit(ScanEvent::Started {
                    mode: self.mode.to_string(),
                    subnets: 1,
                });
                self.ping_only(target, count, interval).await;
                1
            }
            mode => {
                let space = space_for(&mode);
                self.emit(ScanEvent::Started {
                    mode: mode.to_string(),
                    subnets: space.len(),
                });
                self.walk(&space).await;
                space.len()
            }
        };

        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            self.emit(ScanEvent::Cancelled);
        }
        let elapsed = started.elapsed();
        self.emit(ScanEvent::Finished {
            hosts: self.table.len(),
            elapsed,
        });

        ScanReport {
            mode: self.mode,
            hosts: self.table.snapshot(),
            live_subnets: self.live_subnets,
            subnets_probed: self.subnets_probed,
            subnets_total,
            cancelled,
            elapsed,
        }
    }

    fn emit(&self, event: ScanEvent) {
        self.sink.on_event(event);
    }

    async fn walk(&mut self, space: &SubnetSpace) {
        let total = space.len();
        let gated = self.mode.gates_on_liveness();
        let threshold = self.config.liveness_threshold();
        let timeout = self.config.liveness_timeout();

        for (index, subnet) in space.iter().enumerate() {
            if self.cancel.is_cancelled() {
                debug!("stopping before {subnet}");
                break;
            }
            self.subnets_probed += 1;
            self.emit(ScanEvent::SubnetProbing { subnet, index, total });

            if gated {
                let verdict = liveness::classify(&*self.prober, subnet, threshold, timeout).await;
                if !verdict.alive {
                    self.emit(ScanEvent::SubnetUnreachable {
                        subnet,
                        replies: verdict.replies,
                    });
                    continue;
                }
                self.emit(ScanEvent::SubnetReachable {
                    subnet,
                    replies: verdict.replies,
                });
            }
            self.live_subnets += 1;

            if self.cancel.is_cancelled() {
                break;
            }
            self.scan_subnet(subnet).await;

            if let Some(limit) = self.config.max_live_subnets {
                if self.live_subnets >= limit && index + 1 < total {
                    info!("live subnet limit of {limit} reached");
                    self.emit(ScanEvent::LiveSubnetLimit { limit });
                    break;
                }
            }
        }
    }

    async fn scan_subnet(&mut self, subnet: Subnet) {
        let arp = self.prober.arp_sweep(subnet, self.config.timeouts.arp_window).await;
        debug!("{subnet}: {} ARP replies", arp.len());

        let mut found = Vec::with_capacity(arp.len());
        for ip in enrichment_order(arp.keys().copied()) {
            let mac = arp.get(&ip).copied();
            self.record(ip, subnet, DiscoveryMethod::Arp, mac);
            found.push(ip);
        }

        if self.config.deep && !self.cancel.is_cancelled() {
            let echoed = self.icmp_sweep(subnet, &arp).await;
            for ip in enrichment_order(echoed) {
                self.record(ip, subnet, DiscoveryMethod::Icmp, None);
                found.push(ip);
            }
        }

        let enricher = Enricher::new(
            &*self.prober,
            &*self.vendors,
            &self.config,
            &self.cancel,
            &*self.sink,
        );
        for ip in enrichment_order(found) {
            if self.cancel.is_cancelled() {
                break;
            }
            if let Some(host) = self.table.get_mut(&ip) {
                enricher.enrich(host).await;
            }
        }
    }

    /// Echoes every host address that did not answer ARP.
    async fn icmp_sweep(&self, subnet: Subnet, answered: &HashMap<Ipv4Addr, MacAddr>) -> Vec<Ipv4Addr> {
        let hosts = usize::try_from(subnet.host_count()).unwrap_or(usize::MAX);
        let total = hosts.saturating_sub(answered.len());
        if total == 0 {
            return Vec::new();
        }
        let candidates = subnet.hosts().filter(|ip| !answered.contains_key(ip));

        let prober = &*self.prober;
        let sink = &*self.sink;
        let timeout = self.config.timeouts.ping;
        let pool = WorkerPool::new(self.config.limits.host_workers(), self.cancel.clone())
            .with_progress_every(HOST_PROGRESS_EVERY);

        let outcome = pool
            .run(
                candidates,
                total,
                move |ip| async move { prober.ping(ip, timeout).await.then_some(ip) },
                |done, total| {
                    sink.on_event(ScanEvent::Progress {
                        stage: Stage::HostSweep,
                        done,
                        total,
                    })
                },
            )
            .await;

        if outcome.cancelled > 0 {
            debug!("{subnet}: {} echo probes skipped", outcome.cancelled);
        }
        outcome.results
    }

    fn record(&mut self, ip: Ipv4Addr, subnet: Subnet, method: DiscoveryMethod, mac: Option<MacAddr>) {
        if self.table.discover(ip, subnet, method, mac) {
            self.emit(ScanEvent::HostDiscovered { ip, mac, method });
        }
    }

    async fn ping_only(&mut self, target: Ipv4Addr, count: Option<u32>, interval: Duration) {
        let subnet = Subnet::single(target);
        self.subnets_probed = 1;

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut seq = 0u32;
        while count.is_none_or(|count| seq < count) {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            seq += 1;

            let sent = Instant::now();
            if self.prober.ping(target, self.config.timeouts.ping).await {
                let rtt = sent.elapsed();
                self.emit(ScanEvent::EchoReply { ip: target, seq, rtt });
                self.record(target, subnet, DiscoveryMethod::Echo, None);
            } else {
                self.emit(ScanEvent::EchoTimeout { ip: target, seq });
            }
        }

        if self.table.is_empty() {
            return;
        }
        self.live_subnets = 1;
        if !self.config.resolve_hostnames || self.cancel.is_cancelled() {
            return;
        }
        let enricher = Enricher::new(
            &*self.prober,
            &*self.vendors,
            &self.config,
            &self.cancel,
            &*self.sink,
        );
        if let Some(host) = self.table.get_mut(&target) {
            enricher.hostname(host).await;
        }
    }
}

/// The subnets a scan in `mode` walks. A ping test covers only its target.
pub fn space_for(mode: &ScanMode) -> SubnetSpace {
    match mode {
        ScanMode::Quick => SubnetSpace::quick(),
        ScanMode::FullSweep => SubnetSpace::full(),
        ScanMode::Manual(target) => SubnetSpace::manual(target),
        ScanMode::Local { addr } => SubnetSpace::single(Subnet::slash24(*addr)),
        ScanMode::PingOnly { target, .. } => SubnetSpace::single(Subnet::single(*target)),
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

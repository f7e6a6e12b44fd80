//! # Host Enrichment
//!
//! Fills in a discovered host, one stage at a time: OUI vendor, hostname, then for
//! deep scans the SNMP system description and the well-known port sweep. A stage
//! that fails leaves the record as it was and the next stage still runs.
//!
//! Stages only add information, so running them again on an unchanged host gives
//! the same record.

use std::net::Ipv4Addr;

use lanscout_common::config::{ScanConfig, WELL_KNOWN_PORTS};
use lanscout_common::event::{EventSink, ScanEvent, Stage};
use lanscout_common::host::HostRecord;
use lanscout_common::vendors::VendorRepository;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::network::snmp::SYS_DESCR;
use crate::pool::WorkerPool;
use crate::probe::Prober;

const PORT_PROGRESS_EVERY: usize = 50;

pub struct Enricher<'a> {
    prober: &'a dyn Prober,
    vendors: &'a dyn VendorRepository,
    config: &'a ScanConfig,
    cancel: &'a CancellationToken,
    sink: &'a dyn EventSink,
}

impl<'a> Enricher<'a> {
    pub fn new(
        prober: &'a dyn Prober,
        vendors: &'a dyn VendorRepository,
        config: &'a ScanConfig,
        cancel: &'a CancellationToken,
        sink: &'a dyn EventSink,
    ) -> Self {
        Self {
            prober,
            vendors,
            config,
            cancel,
            sink,
        }
    }

    /// Runs every stage that applies to this scan, stopping between stages when
    /// the scan is cancelled.
    pub async fn enrich(&self, host: &mut HostRecord) {
        self.vendor(host);

        if self.cancel.is_cancelled() {
            return;
        }
        if self.config.resolve_hostnames {
            self.hostname(host).await;
        }

        if !self.config.deep || self.cancel.is_cancelled() {
            return;
        }
        self.os_description(host).await;

        if self.cancel.is_cancelled() {
            return;
        }
        self.open_ports(host).await;
    }

    pub fn vendor(&self, host: &mut HostRecord) {
        if host.vendor.is_some() {
            return;
        }
        if let Some(mac) = host.mac {
            host.vendor = self.vendors.get_vendor(mac);
        }
    }

    pub async fn hostname(&self, host: &mut HostRecord) {
        if host.hostname.is_some() {
            return;
        }
        let ip = host.ip();
        if let Some(name) = self.prober.reverse_lookup(ip, self.config.timeouts.dns).await {
            if host.learn_hostname(name.clone()) {
                self.sink.on_event(ScanEvent::HostnameResolved { ip, hostname: name });
            }
        }
    }

    pub async fn os_description(&self, host: &mut HostRecord) {
        let ip = host.ip();
        let answer = self
            .prober
            .snmp_get(ip, SYS_DESCR, &self.config.community, self.config.timeouts.snmp)
            .await;

        match answer {
            Ok(Some(description)) => {
                if host.learn_os(description) {
                    self.sink.on_event(ScanEvent::OsDetected {
                        ip,
                        description: host.os_display().to_string(),
                    });
                }
            }
            Ok(None) => {
                debug!("no SNMP answer from {ip}");
                self.sink.on_event(ScanEvent::SnmpSilent { ip });
            }
            Err(e) => {
                warn!("SNMP query to {ip} could not be sent: {e:#}");
                self.sink.on_event(ScanEvent::failure(format!("SNMP {ip}"), format!("{e:#}")));
            }
        }
    }

    pub async fn open_ports(&self, host: &mut HostRecord) {
        let ip = host.ip();
        let prober = self.prober;
        let sink = self.sink;
        let timeout = self.config.timeouts.tcp_connect;

        let pool = WorkerPool::new(self.config.limits.port_workers(), self.cancel.clone())
            .with_progress_every(PORT_PROGRESS_EVERY);

        let outcome = pool
            .run(
                WELL_KNOWN_PORTS,
                WELL_KNOWN_PORTS.len(),
                move |port| async move {
                    let open = prober.tcp_connect(ip, port, timeout).await;
                    if open {
                        sink.on_event(ScanEvent::PortOpen { ip, port });
                    }
                    open.then_some(port)
                },
                |done, total| {
                    sink.on_event(ScanEvent::Progress {
                        stage: Stage::PortSweep,
                        done,
                        total,
                    })
                },
            )
            .await;

        let added = host.add_ports(outcome.results);
        debug!("{ip}: {added} new open port(s), {} probe(s) skipped", outcome.cancelled);
    }
}

/// Addresses from `found`, ascending and without duplicates.
pub fn enrichment_order(found: impl IntoIterator<Item = Ipv4Addr>) -> Vec<Ipv4Addr> {
    let mut order: Vec<Ipv4Addr> = found.into_iter().collect();
    order.sort_unstable();
    order.dedup();
    order
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

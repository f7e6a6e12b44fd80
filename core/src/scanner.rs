//! # Scanner
//!
//! Entry point for running scans. A [`Scanner`] holds the probe and vendor backends
//! and allows one scan at a time; [`Scanner::start`] validates the request, spawns
//! the coordinating task and hands back a [`ScanHandle`] to stop or await it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lanscout_common::ScanError;
use lanscout_common::config::{ScanMode, ScanRequest};
use lanscout_common::event::EventSink;
use lanscout_common::network::space::SubnetSpace;
use lanscout_common::vendors::VendorRepository;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::probe::Prober;
use crate::session::{ScanReport, ScanSession};

pub struct Scanner {
    prober: Arc<dyn Prober>,
    vendors: Arc<dyn VendorRepository>,
    active: Arc<AtomicBool>,
}

/// Clears the active flag when the coordinating task ends, panics included.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Scanner {
    pub fn new(prober: Arc<dyn Prober>, vendors: Arc<dyn VendorRepository>) -> Self {
        Self {
            prober,
            vendors,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Starts a scan in the background. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// [`ScanError::ConfirmationRequired`] for an unconfirmed full sweep and
    /// [`ScanError::AlreadyRunning`] while another scan from this scanner is active.
    /// Nothing is sent on the network in either case.
    pub fn start(&self, request: ScanRequest, sink: Arc<dyn EventSink>) -> Result<ScanHandle, ScanError> {
        if request.mode == ScanMode::FullSweep && !request.confirm_full_sweep {
            return Err(ScanError::ConfirmationRequired {
                subnets: SubnetSpace::full().len(),
            });
        }

        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ScanError::AlreadyRunning);
        }
        let guard = ActiveGuard(self.active.clone());

        info!("Starting {}", request.mode);
        let cancel = CancellationToken::new();
        let session = ScanSession::new(
            request,
            self.prober.clone(),
            self.vendors.clone(),
            sink,
            cancel.clone(),
        );

        let task = tokio::spawn(async move {
            let _guard = guard;
            session.run().await
        });

        Ok(ScanHandle { cancel, task })
    }
}

pub struct ScanHandle {
    cancel: CancellationToken,
    task: JoinHandle<ScanReport>,
}

impl ScanHandle {
    /// Asks the scan to stop. Probes already in flight finish or time out, and the
    /// report still holds every host found so far.
    pub fn stop(&self) {
        debug!("stop requested");
        self.cancel.cancel();
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn wait(self) -> Result<ScanReport, ScanError> {
        self.task.await.map_err(|e| ScanError::Coordinator(e.to_string()))
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

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use lanscout_common::event::{EventSink, ScanEvent};
use lanscout_core::sink::TracingSink;
use tracing::warn;

use crate::terminal::spinner;

/// Routes scan events to the terminal: progress goes to the spinner line,
/// everything else is logged.
#[derive(Debug, Default)]
pub struct TerminalSink {
    hosts: AtomicUsize,
    echoes: AtomicU32,
    replies: AtomicU32,
}

impl TerminalSink {
    /// Echoes sent and answered by a ping test.
    pub fn echo_counts(&self) -> (u32, u32) {
        (self.echoes.load(Ordering::Relaxed), self.replies.load(Ordering::Relaxed))
    }
}

impl EventSink for TerminalSink {
    fn on_event(&self, event: ScanEvent) {
        match &event {
            ScanEvent::SubnetProbing { .. } | ScanEvent::Progress { .. } => {
                spinner::report_status(&event);
                return;
            }
            ScanEvent::HostDiscovered { .. } => {
                let found = self.hosts.fetch_add(1, Ordering::Relaxed) + 1;
                spinner::report_discovery_progress(found);
            }
            ScanEvent::EchoReply { .. } => {
                self.echoes.fetch_add(1, Ordering::Relaxed);
                self.replies.fetch_add(1, Ordering::Relaxed);
            }
            ScanEvent::EchoTimeout { .. } => {
                self.echoes.fetch_add(1, Ordering::Relaxed);
                warn!("{event}");
                return;
            }
            _ => {}
        }
        TracingSink.on_event(event);
    }
}

//! Ready-made [`EventSink`]s.

use lanscout_common::event::{Category, EventSink, ScanEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Forwards events into an unbounded channel. Events sent after the receiver is
/// dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<ScanEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, UnboundedReceiver<ScanEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn on_event(&self, event: ScanEvent) {
        let _ = self.tx.send(event);
    }
}

/// Logs each event at a level matching its category.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&self, event: ScanEvent) {
        match event.category() {
            Category::Reachable | Category::Info => info!("{event}"),
            Category::Error => warn!("{event}"),
            Category::Probing | Category::Unreachable => debug!("{event}"),
        }
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

//! Datalink capture.
//!
//! pnet receivers block, so each capture gets a listener thread that copies frames
//! into an unbounded tokio channel. The thread exits once the receiving half of
//! that channel is dropped; the short read timeout makes sure it notices.

use std::io::ErrorKind;
use std::thread;
use std::time::Duration;

use anyhow::{Context, bail};
use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use tokio::sync::mpsc;
use tracing::{debug, trace};

const READ_TIMEOUT: Duration = Duration::from_millis(50);

pub struct EthernetHandle {
    pub tx: Box<dyn DataLinkSender>,
    pub rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl EthernetHandle {
    /// Throws away frames that arrived before the next sweep started.
    pub fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

pub fn start_capture(intf: &NetworkInterface) -> anyhow::Result<EthernetHandle> {
    let cfg = Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Config::default()
    };
    let (tx, rx) = open_eth_channel(intf, &cfg, datalink::channel)?;
    Ok(spawn_listener(tx, rx))
}

/// Wires an already opened sender/receiver pair into an [`EthernetHandle`].
pub fn spawn_listener(
    tx: Box<dyn DataLinkSender>,
    mut rx: Box<dyn DataLinkReceiver>,
) -> EthernetHandle {
    let (queue_tx, queue_rx) = mpsc::unbounded_channel::<Vec<u8>>();

    thread::spawn(move || {
        loop {
            if queue_tx.is_closed() {
                break;
            }
            match rx.next() {
                Ok(frame) => {
                    if queue_tx.send(frame.to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => trace!("capture interrupted"),
                Err(e) => {
                    debug!("capture stopped: {e}");
                    break;
                }
            }
        }
    });

    EthernetHandle { tx, rx: queue_rx }
}

fn open_eth_channel<F>(
    intf: &NetworkInterface,
    cfg: &Config,
    channel_opener: F,
) -> anyhow::Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>)>
where
    F: FnOnce(&NetworkInterface, Config) -> std::io::Result<Channel>,
{
    let ch = channel_opener(intf, *cfg).with_context(|| format!("opening on {}", intf.name))?;
    match ch {
        Channel::Ethernet(tx, rx) => Ok((tx, rx)),
        _ => bail!("non-ethernet channel for {}", intf.name),
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

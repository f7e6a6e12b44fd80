use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use colored::*;
use console::Term;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::terminal::colors;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Watches the keyboard while a scan runs and cancels `token` on `q` or Ctrl-C.
///
/// The terminal is in raw mode for as long as the handle lives.
pub struct StopKeys {
    done: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl StopKeys {
    pub fn listen(token: CancellationToken) -> Self {
        let done = Arc::new(AtomicBool::new(false));

        if !std::io::stdin().is_terminal() {
            debug!("stdin is not a terminal, stop keys disabled");
            return Self { done, thread: None };
        }
        if let Err(e) = enable_raw_mode() {
            warn!("Could not read keys, only Ctrl-C will stop the scan: {e}");
            return Self { done, thread: None };
        }

        let finished = done.clone();
        let thread = thread::spawn(move || {
            while !finished.load(Ordering::Relaxed) && !token.is_cancelled() {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        debug!("keyboard poll failed: {e}");
                        break;
                    }
                }
                if let Ok(Event::Key(key_event)) = event::read() {
                    let is_q = key_event.code == KeyCode::Char('q');
                    let is_ctrl_c = key_event.code == KeyCode::Char('c')
                        && key_event.modifiers.contains(KeyModifiers::CONTROL);

                    if (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press {
                        token.cancel();
                    }
                }
            }
        });

        Self {
            done,
            thread: Some(thread),
        }
    }
}

impl Drop for StopKeys {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
            let _ = disable_raw_mode();
        }
    }
}

/// Asks before a scan of `subnets` subnets. Anything but `y`/`yes` declines.
pub fn confirm_full_sweep(subnets: usize) -> anyhow::Result<bool> {
    let term = Term::stderr();
    let question = format!(
        "A full sweep probes {} subnets and can take hours. Continue? [y/N] ",
        subnets.to_string().bold().color(colors::ACCENT)
    );
    term.write_str(&question).context("could not write the prompt")?;
    let answer = term.read_line().context("could not read the answer")?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

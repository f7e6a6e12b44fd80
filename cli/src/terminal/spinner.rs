use std::borrow::Cow;
use std::sync::OnceLock;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use colored::*;
use crossterm::terminal;
use indicatif::{ProgressBar, ProgressStyle};

use crate::terminal::colors;

/// How long a status line stays before a tip may replace it.
const STATUS_HOLD: Duration = Duration::from_secs(1);
const TIP_HOLD: Duration = Duration::from_secs(1);
/// A tip is never cut shorter than this by an incoming status.
const TIP_MIN_SHOWN: Duration = Duration::from_millis(750);
const TICK: Duration = Duration::from_millis(100);

const TIPS: &[&str] = &[
    "You can press 'q' to finish early",
    "Hosts found so far are kept when you stop",
];

const FRAMES: &[&str] = &[
    "▁▁▁▁▁", "▁▂▂▂▁", "▁▄▂▄▁", "▂▄▆▄▂", "▄▆█▆▄", "▂▄▆▄▂", "▁▄▂▄▁", "▁▂▂▂▁",
];

pub struct SpinnerHandle {
    pub spinner: ProgressBar,
    tx: Sender<String>,
}

impl SpinnerHandle {
    /// Queues a status line; only the newest queued line is shown.
    pub fn send_to_queue(&self, message: String) {
        let _ = self.tx.send(message);
    }

    pub fn println(&self, msg: &str) {
        let raw = terminal::is_raw_mode_enabled().unwrap_or(false);
        if self.spinner.is_hidden() || self.spinner.is_finished() {
            eprintln!("{}", with_line_endings(msg, raw));
        } else {
            self.spinner.println(with_line_endings(msg, raw));
        }
    }

    pub fn finish_and_clear(&self) {
        self.spinner.finish_and_clear();
    }
}

static SPINNER: OnceLock<SpinnerHandle> = OnceLock::new();

pub fn get_spinner() -> &'static SpinnerHandle {
    SPINNER.get_or_init(init_spinner)
}

fn init_spinner() -> SpinnerHandle {
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(FRAMES);

    let bar = ProgressBar::new_spinner();
    bar.set_style(style);
    bar.enable_steady_tick(TICK);

    let (tx, rx) = mpsc::channel::<String>();
    let ticker = StatusTicker::new(bar.clone());
    thread::spawn(move || ticker.run(rx));

    SpinnerHandle { spinner: bar, tx }
}

/// Alternates between queued scan status and idle tips on the spinner line.
struct StatusTicker {
    bar: ProgressBar,
    next_tip: usize,
    deadline: Instant,
    tip_shown_at: Option<Instant>,
}

impl StatusTicker {
    fn new(bar: ProgressBar) -> Self {
        Self {
            bar,
            next_tip: 0,
            deadline: Instant::now() + TIP_HOLD,
            tip_shown_at: None,
        }
    }

    fn run(mut self, rx: Receiver<String>) {
        while !self.bar.is_finished() {
            let wait = self.deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok(first) => {
                    let latest = rx.try_iter().last().unwrap_or(first);
                    self.show_status(latest);
                }
                Err(RecvTimeoutError::Timeout) => self.show_tip(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    fn show_status(&mut self, status: String) {
        if let Some(shown_at) = self.tip_shown_at.take() {
            let remaining = TIP_MIN_SHOWN.saturating_sub(shown_at.elapsed());
            if !remaining.is_zero() {
                thread::sleep(remaining);
            }
        }
        self.bar.set_message(status);
        self.deadline = Instant::now() + STATUS_HOLD;
    }

    fn show_tip(&mut self) {
        let tip = TIPS[self.next_tip % TIPS.len()];
        self.bar.set_message(tip.italic().white().to_string());
        self.next_tip += 1;
        self.tip_shown_at = Some(Instant::now());
        self.deadline = Instant::now() + TIP_HOLD;
    }
}

pub fn report_discovery_progress(count: usize) {
    let hosts = format!("{count} hosts").green().bold();
    report_status(format!("Found {hosts} so far..."));
}

pub fn report_status(status: impl std::fmt::Display) {
    get_spinner().send_to_queue(status.to_string().color(colors::TEXT_DEFAULT).to_string());
}

/// In raw mode a bare `\n` keeps the column, so every line must also return
/// the cursor. The trailing `\r` goes out before the newline the printer appends.
fn with_line_endings(msg: &str, raw: bool) -> Cow<'_, str> {
    if raw {
        Cow::Owned(format!("{}\r", msg.replace('\n', "\r\n")))
    } else {
        Cow::Borrowed(msg)
    }
}

/// Routes log output above the spinner line.
pub struct SpinnerWriter;

impl std::io::Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        get_spinner().println(text.trim_end());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
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

use std::{cell::Cell, fmt::Display};

use crate::terminal::colors;
use colored::*;
use tracing::info;

pub const TOTAL_WIDTH: usize = 64;
/// Events on this target are printed verbatim, without a level prefix.
pub const PRINT_TARGET: &str = "lanscout::print";
const TREE_KEY_WIDTH: usize = 7;

thread_local! {
    static KEY_WIDTH: Cell<usize> = const { Cell::new(0) }
}

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        tracing::info!($($arg)*)
    };
}

/// Values that already carry a color keep it; plain text takes the default.
pub trait WithDefaultColor {
    fn with_default(self, default_color: Color) -> ColoredString;
}

impl WithDefaultColor for &str {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for String {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for ColoredString {
    fn with_default(self, _default_color: Color) -> ColoredString {
        self
    }
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

/// A full-width line of `fill` with `label` centered in it.
fn rule(fill: &str, label: Option<ColoredString>) -> String {
    let label_width = label.as_ref().map_or(0, |l| console::measure_text_width(&l.to_string()));
    let padding = TOTAL_WIDTH.saturating_sub(label_width);
    let left = fill.repeat(padding / 2).color(colors::SEPARATOR);
    let right = fill.repeat(padding - padding / 2).color(colors::SEPARATOR);
    match label {
        Some(label) => format!("{left}{label}{right}"),
        None => format!("{left}{right}"),
    }
}

pub fn banner(q_level: u8) {
    if q_level > 0 {
        return;
    }
    let title = format!("⟦ LANSCOUT v{} ⟧", env!("CARGO_PKG_VERSION"));
    print(&rule("═", Some(title.bright_green().bold())));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }
    let title = format!("⟦ {} ⟧", msg.to_uppercase());
    print(&rule("─", Some(title.bright_green())));
}

pub fn fat_separator() {
    print(&rule("═", None));
}

pub fn end_of_program() {
    fat_separator();
}

/// Widest key of the next block of `aligned_line`s.
pub fn set_key_width<'a>(keys: impl IntoIterator<Item = &'a str>) {
    KEY_WIDTH.set(keys.into_iter().map(str::len).max().unwrap_or(0));
}

/// `> Key.....: value`, dotted out to the width from `set_key_width`.
pub fn aligned_line<V>(key: &str, value: V)
where
    V: Display + WithDefaultColor,
{
    let dots = ".".repeat((KEY_WIDTH.get() + 1).saturating_sub(key.len()));
    print(&format!(
        "{} {}{}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value.with_default(colors::TEXT_DEFAULT)
    ));
}

pub fn tree_head(idx: usize, name: &str) {
    print(&format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    ));
}

pub fn as_tree_one_level(details: Vec<(String, ColoredString)>) {
    let last = details.len().saturating_sub(1);
    for (i, (key, value)) in details.into_iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        let dots = ".".repeat(TREE_KEY_WIDTH.saturating_sub(key.len()));
        print(&format!(
            " {} {}{}{} {}",
            branch.color(colors::SEPARATOR),
            key.color(colors::TEXT_DEFAULT),
            dots.color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        ));
    }
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{space}{msg}"));
}

const NO_HOSTS_ART: &str = r#"
         _   _  ___    _   _  ___  ____ _____ ____
        | \ | |/ _ \  | | | |/ _ \/ ___|_   _/ ___|
        |  \| | | | | | |_| | | | \___ \ | | \___ \
        | |\  | |_| | |  _  | |_| |___) || |  ___) |
        |_| \_|\___/  |_| |_|\___/|____/ |_| |____/
"#;

pub fn no_results() {
    print(&NO_HOSTS_ART.red().bold().to_string());
}

//! End-to-end scans against a simulated network.

pub mod support;

#[cfg(test)]
mod discovery;
#[cfg(test)]
mod scanner;

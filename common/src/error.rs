//! # Scan Errors
//!
//! Only two things abort a scan before it starts: the raw transports cannot be
//! opened, or the user typed a target that is not an address. Everything that goes
//! wrong *during* a scan is reported as an event and the scan carries on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Raw layer-2 (ARP) or ICMP access could not be acquired.
    #[error("{layer} transport unavailable: {reason}")]
    TransportUnavailable { layer: &'static str, reason: String },

    /// A manual target failed IPv4 address / CIDR / range validation.
    #[error("invalid target '{input}': {reason}")]
    InvalidTarget { input: String, reason: String },

    #[error("a scan is already running; stop it before starting another")]
    AlreadyRunning,

    /// A full RFC1918 sweep was requested without the caller confirming its cost.
    #[error("full sweep covers {subnets} subnets and must be confirmed before it starts")]
    ConfirmationRequired { subnets: usize },

    #[error("scan coordinator failed: {0}")]
    Coordinator(String),
}

impl ScanError {
    pub fn invalid_target(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised before anything touched the network.
    pub fn is_fatal_setup(&self) -> bool {
        matches!(
            self,
            Self::TransportUnavailable { .. } | Self::InvalidTarget { .. }
        )
    }
}

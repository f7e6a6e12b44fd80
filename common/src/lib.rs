//! # lanscout common
//!
//! Data model shared by the scan engine and its front ends.
//!
//! * **[`network`]**: subnets, the candidate subnet space, manual targets and LAN
//!   interface selection.
//! * **[`host`]**: the per-host record that enrichment fills in.
//! * **[`config`]**: what a caller decides before a scan starts.
//! * **[`event`]**: what a running scan reports.
//! * **[`error`]**: the errors that stop a scan from starting.

pub mod config;
pub mod error;
pub mod event;
pub mod host;
pub mod network;
pub mod vendors;

pub use error::ScanError;

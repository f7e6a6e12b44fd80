//! Discovery engine: probes, the liveness gate, the worker pool, enrichment and
//! the scan coordinator.

pub mod aggregate;
pub mod enrich;
pub mod liveness;
pub mod network;
pub mod pool;
pub mod probe;
pub mod scanner;
pub mod session;
pub mod sink;
pub mod vendors;

pub use probe::{NetProber, Prober};
pub use scanner::{ScanHandle, Scanner};
pub use session::ScanReport;

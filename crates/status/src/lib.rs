//! Debounced health status scanner for the BuckyOS tray.
//!
//! The scanner repeatedly asks a [`HealthOracle`] whether the system is
//! healthy and turns possibly-failing, possibly-slow answers into a single
//! [`Status`] with change notifications:
//!
//! - polling spacing is a two-level backoff (fast while unstable, relaxed
//!   after a success), see [`ScanConfig`];
//! - a failed query rotates the displayed status to its successor;
//! - notifications fire only when the value actually changes.

pub mod oracle;
pub mod scanner;
pub mod session;
pub mod status;
pub mod timing;

pub use oracle::{HealthOracle, OracleError, OracleFuture};
pub use scanner::{StatusChangeFn, StatusScanner};
pub use session::{QueryTicket, ScanSession, StatusChange};
pub use status::Status;
pub use timing::{Debounced, ScanConfig};

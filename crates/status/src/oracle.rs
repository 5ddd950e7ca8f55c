//! Health oracle boundary.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::status::Status;

/// Boxed future returned by [`HealthOracle::query`].
pub type OracleFuture<'a> = Pin<Box<dyn Future<Output = Result<Status, OracleError>> + Send + 'a>>;

/// External component able to answer "is the system healthy?".
///
/// Answers are best effort. Implementations may fail for transient reasons;
/// the scanner folds failures into the displayed status instead of
/// surfacing them.
pub trait HealthOracle: Send + Sync {
    /// Performs one health query.
    fn query(&self) -> OracleFuture<'_>;
}

/// Reasons a health query produced no status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("process enumeration failed: {0}")]
    Enumeration(String),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

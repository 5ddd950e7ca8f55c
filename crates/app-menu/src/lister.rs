//! Application lister boundary.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::types::AppRecord;

/// Boxed future returned by [`ApplicationLister::list`].
pub type ListFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<AppRecord>, ListError>> + Send + 'a>>;

/// Source of the current application list.
///
/// The caller tags every call and carries the tag alongside the result, so
/// implementations need not know about request ordering.
pub trait ApplicationLister: Send + Sync {
    fn list(&self) -> ListFuture<'_>;
}

/// Reasons a list fetch produced no result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("node configuration unavailable: {0}")]
    Unavailable(String),

    #[error("invalid node configuration: {0}")]
    Invalid(String),

    #[error("list timed out after {0:?}")]
    Timeout(Duration),
}

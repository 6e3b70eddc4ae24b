//! Explicit failure policies for calls whose errors never reach the caller

use tracing::warn;

use crate::ServiceError;

/// What a swallowed failure turns into.
///
/// Each call site names its policy so tests can assert it directly. No policy
/// retries: every remote call is attempted once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Failure means "denied" / "not authenticated"
    FailClosed,
    /// Failure means "no data"; sibling reads still render
    FailEmpty,
}

impl FailurePolicy {
    /// Unwrap `result`, substituting `T::default()` on failure.
    ///
    /// For `bool` and access decisions the default is the denying value,
    /// for collections and counters it is empty/zero.
    pub fn settle<T: Default>(self, operation: &str, result: Result<T, ServiceError>) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                match self {
                    FailurePolicy::FailClosed => {
                        warn!("{} failed, treating as denied: {}", operation, e)
                    }
                    FailurePolicy::FailEmpty => {
                        warn!("{} failed, continuing with empty result: {}", operation, e)
                    }
                }
                T::default()
            }
        }
    }
}

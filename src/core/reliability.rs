//! core::reliability
//!
//! Bounded retry for fallible operations.
//!
//! # Design
//!
//! This is a best-effort shim for transient faults (short-lived file
//! locks, network blips), not a resilience policy engine. There is no
//! backoff between attempts, no error aggregation: the operation runs up
//! to `max_attempts` times and the *last* failure is the one reported.
//!
//! # Example
//!
//! ```
//! use bindery::core::reliability::{retry, RetryError};
//!
//! let mut calls = 0;
//! let result: Result<u32, RetryError<&str>> = retry(3, || {
//!     calls += 1;
//!     if calls < 3 { Err("flaky") } else { Ok(42) }
//! });
//! assert_eq!(result.unwrap(), 42);
//! assert_eq!(calls, 3);
//! ```

use std::future::Future;

use thiserror::Error;

/// Error from a retried operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<E> {
    /// `max_attempts` was zero. The operation was never invoked; this is
    /// a caller bug, not an operational failure, and is reported
    /// synchronously.
    #[error("retry requires at least one attempt")]
    InvalidAttempts,

    /// Every attempt failed; this is the last error observed.
    #[error("operation failed after {attempts} attempt(s): {source}")]
    Exhausted {
        /// Total attempts made.
        attempts: u32,
        /// The final attempt's error. Earlier errors are discarded.
        source: E,
    },
}

impl<E> RetryError<E> {
    /// Unwrap the underlying operation error, if any.
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::InvalidAttempts => None,
            RetryError::Exhausted { source, .. } => Some(source),
        }
    }
}

/// Run `op` up to `max_attempts` times, returning the first success.
///
/// # Errors
///
/// - [`RetryError::InvalidAttempts`] if `max_attempts` is zero (`op` is
///   never invoked)
/// - [`RetryError::Exhausted`] carrying the last failure otherwise
pub fn retry<T, E>(
    max_attempts: u32,
    mut op: impl FnMut() -> Result<T, E>,
) -> Result<T, RetryError<E>> {
    if max_attempts == 0 {
        return Err(RetryError::InvalidAttempts);
    }

    let mut attempt = 0;
    loop {
        attempt += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: err,
                });
            }
            Err(_) => {}
        }
    }
}

/// Async counterpart of [`retry`] for network operations.
///
/// Same contract: no backoff, last error wins, zero attempts is a caller
/// usage error reported without invoking the operation.
pub async fn retry_async<T, E, F, Fut>(max_attempts: u32, mut op: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if max_attempts == 0 {
        return Err(RetryError::InvalidAttempts);
    }

    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: err,
                });
            }
            Err(_) => {}
        }
    }
}

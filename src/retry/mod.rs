//! Retrying an operation over an explicit sequence of wait intervals.
//!
//! - **Explicit waits**: an [`IntervalSequence`] lists every wait up front.
//!   There is no backoff curve to compute; a sequence of `N` waits allows
//!   `N + 1` attempts.
//! - **Attempt-aware operations**: the operation receives `(attempt, limit)`
//!   and may decide for itself when to stop trying.
//! - **Nothing is lost**: when every attempt fails, the [`ErrorAggregate`]
//!   holds each failure in the order it happened.
//! - **Contained panics**: a panic inside one attempt is recorded as that
//!   attempt's failure and the run carries on.
//!
//! # Quick Start
//!
//! ```rust
//! use reattempt::with_interval_sequence;
//! use std::time::Duration;
//!
//! let waits = [Duration::from_millis(1), Duration::from_millis(2)];
//!
//! let result = with_interval_sequence(
//!     &waits,
//!     Some(|attempt: usize, limit: usize| {
//!         if attempt == limit - 1 {
//!             Ok("connected")
//!         } else {
//!             Err(format!("attempt {} of {} refused", attempt + 1, limit))
//!         }
//!     }),
//! );
//!
//! assert_eq!(result, Ok("connected"));
//! ```
//!
//! # Error Types
//!
//! - [`RetryError::NilOperation`]: no operation was given, nothing ran
//! - [`RetryError::Exhausted`]: every attempt failed; carries the [`ErrorAggregate`]
//! - [`AttemptFailure`]: one attempt's returned error or contained panic

#[cfg(feature = "async")]
mod async_executor;
mod error;
mod executor;
mod fault;
mod intervals;
#[cfg(feature = "serde")]
mod serde_impl;

pub use error::{AttemptFailure, ErrorAggregate, RetryError};
pub use executor::{with_fixed_interval, with_interval_sequence, RetryEvent, RetryExecutor};
pub use intervals::{IntervalCursor, IntervalSequence};

#[cfg(test)]
mod tests;

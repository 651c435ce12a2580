//! # Reattempt
//!
//! Run a fallible operation over an explicit sequence of wait intervals,
//! and keep every failure if it never succeeds.
//!
//! ## Philosophy
//!
//! **Reattempt** keeps retrying boring:
//! - **Explicit** = You list the waits. `N` waits means `N + 1` attempts.
//! - **Honest** = When every attempt fails you get all the errors back, in order.
//!
//! ## Quick Example
//!
//! ```rust
//! use reattempt::{with_fixed_interval, RetryError};
//! use std::time::Duration;
//!
//! fn connect(attempt: usize, limit: usize) -> Result<&'static str, String> {
//!     if attempt + 1 < limit {
//!         Err(format!("Error {}", attempt))
//!     } else {
//!         Ok("connected")
//!     }
//! }
//!
//! // Four waits of 1ms: up to five attempts.
//! let result = with_fixed_interval(Duration::from_millis(1), 4, Some(connect));
//! assert_eq!(result, Ok("connected"));
//!
//! // No waits: a single attempt, and its error comes back in the aggregate.
//! let result = with_fixed_interval(Duration::ZERO, 0, Some(|_: usize, _: usize| {
//!     Err::<(), _>("Error A")
//! }));
//!
//! match result {
//!     Err(RetryError::Exhausted(aggregate)) => {
//!         assert_eq!(aggregate.len(), 1);
//!         assert_eq!(aggregate.errors().next(), Some(&"Error A"));
//!     }
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```
//!
//! ## Features
//!
//! - `async`: `RetryExecutor::run_async` on tokio
//! - `tracing`: log failed attempts, contained panics and exhaustion
//! - `serde`: (de)serialize [`IntervalSequence`] as a list of milliseconds
//! - `proptest`: `Arbitrary` for [`IntervalSequence`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod retry;
pub mod testing;

// Re-exports
pub use retry::{
    with_fixed_interval, with_interval_sequence, AttemptFailure, ErrorAggregate, IntervalCursor,
    IntervalSequence, RetryError, RetryEvent, RetryExecutor,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::retry::{
        with_fixed_interval, with_interval_sequence, AttemptFailure, ErrorAggregate,
        IntervalSequence, RetryError, RetryEvent, RetryExecutor,
    };
}

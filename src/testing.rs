//! Testing utilities and helpers for retry runs
//!
//! This module provides ergonomic utilities for testing code that retries
//! operations. It includes a recording operation, assertion macros, and
//! property-based testing support.
//!
//! # Examples
//!
//! ## AttemptRecorder
//!
//! ```rust
//! use reattempt::testing::AttemptRecorder;
//! use reattempt::RetryExecutor;
//! use std::time::Duration;
//!
//! let recorder = AttemptRecorder::succeed_on(2, |attempt| format!("Error {}", attempt));
//! let result = RetryExecutor::with_fixed_interval(Duration::ZERO, 5).run(recorder.operation());
//!
//! assert!(result.is_ok());
//! assert_eq!(recorder.count(), 3);
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use reattempt::{assert_exhausted, assert_retry_ok, with_fixed_interval};
//! use std::time::Duration;
//!
//! let ok = with_fixed_interval(Duration::ZERO, 1, Some(|_: usize, _: usize| Ok::<_, String>(1)));
//! assert_retry_ok!(ok);
//!
//! let failed = with_fixed_interval(Duration::ZERO, 1, Some(|_: usize, _: usize| Err::<(), _>("no")));
//! assert_exhausted!(failed, 2);
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// One recorded invocation of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptCall {
    /// The attempt index the operation received.
    pub attempt: usize,
    /// The limit the operation received.
    pub limit: usize,
    /// When the invocation started.
    pub at: Instant,
}

type Script<T, E> = dyn FnMut(usize, usize) -> Result<T, E> + Send;

/// A scripted operation that records every invocation.
///
/// The recorder hands out operations with [`AttemptRecorder::operation`];
/// every call made through them is logged with its `(attempt, limit)` and a
/// timestamp, so tests can check how many attempts ran and how far apart
/// they were.
///
/// # Example
///
/// ```rust
/// use reattempt::testing::AttemptRecorder;
/// use reattempt::with_interval_sequence;
/// use std::time::Duration;
///
/// let recorder = AttemptRecorder::always_fail(|attempt| attempt);
/// let result = with_interval_sequence(&[Duration::ZERO; 2], Some(recorder.operation()));
///
/// assert!(result.is_err());
/// assert_eq!(recorder.attempts(), vec![0, 1, 2]);
/// assert!(recorder.calls().iter().all(|call| call.limit == 3));
/// ```
pub struct AttemptRecorder<T, E> {
    script: Arc<Mutex<Box<Script<T, E>>>>,
    calls: Arc<Mutex<Vec<AttemptCall>>>,
}

impl<T, E> std::fmt::Debug for AttemptRecorder<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttemptRecorder")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

impl<T, E> AttemptRecorder<T, E> {
    /// Record calls to an arbitrary script.
    pub fn new<F>(script: F) -> Self
    where
        F: FnMut(usize, usize) -> Result<T, E> + Send + 'static,
    {
        Self {
            script: Arc::new(Mutex::new(Box::new(script))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// An operation that can be handed to an executor.
    ///
    /// Every operation from the same recorder shares one call log.
    pub fn operation(&self) -> impl FnMut(usize, usize) -> Result<T, E> + Send + 'static
    where
        T: 'static,
        E: 'static,
    {
        let script = Arc::clone(&self.script);
        let calls = Arc::clone(&self.calls);
        move |attempt, limit| {
            calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(AttemptCall {
                    attempt,
                    limit,
                    at: Instant::now(),
                });
            let mut script = script.lock().unwrap_or_else(PoisonError::into_inner);
            let run = &mut *script;
            run(attempt, limit)
        }
    }

    /// Every recorded call, in order.
    pub fn calls(&self) -> Vec<AttemptCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded calls.
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// The attempt index of every recorded call.
    pub fn attempts(&self) -> Vec<usize> {
        self.calls().iter().map(|call| call.attempt).collect()
    }

    /// Time between the starts of consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        self.calls()
            .windows(2)
            .map(|pair| pair[1].at.duration_since(pair[0].at))
            .collect()
    }
}

impl<E> AttemptRecorder<(), E> {
    /// Fail every attempt with the error built from its index.
    pub fn always_fail<G>(mut make_error: G) -> Self
    where
        G: FnMut(usize) -> E + Send + 'static,
    {
        Self::new(move |attempt, _| Err(make_error(attempt)))
    }

    /// Fail every attempt before `success_attempt`, then succeed.
    pub fn succeed_on<G>(success_attempt: usize, mut make_error: G) -> Self
    where
        G: FnMut(usize) -> E + Send + 'static,
    {
        Self::new(move |attempt, _| {
            if attempt >= success_attempt {
                Ok(())
            } else {
                Err(make_error(attempt))
            }
        })
    }
}

/// Assert that a retry run succeeded.
///
/// This macro will panic if the run returned an error.
///
/// # Example
///
/// ```rust
/// use reattempt::{assert_retry_ok, RetryExecutor};
///
/// let result = RetryExecutor::with_fixed_interval(std::time::Duration::ZERO, 0)
///     .run(|_, _| Ok::<_, String>(()));
/// assert_retry_ok!(result);
/// ```
#[macro_export]
macro_rules! assert_retry_ok {
    ($result:expr) => {
        match $result {
            Ok(_) => {}
            Err(e) => {
                panic!("Expected Ok, got retry error: {:?}", e);
            }
        }
    };
}

/// Assert that a retry run was exhausted, optionally after an exact number of attempts.
///
/// # Example
///
/// ```rust
/// use reattempt::{assert_exhausted, RetryExecutor};
///
/// let result = RetryExecutor::with_fixed_interval(std::time::Duration::ZERO, 2)
///     .run(|_, _| Err::<(), _>("down"));
/// assert_exhausted!(result);
///
/// let result = RetryExecutor::with_fixed_interval(std::time::Duration::ZERO, 2)
///     .run(|_, _| Err::<(), _>("down"));
/// assert_exhausted!(result, 3);
/// ```
#[macro_export]
macro_rules! assert_exhausted {
    ($result:expr) => {
        match $result {
            Err($crate::RetryError::Exhausted(_)) => {}
            Err($crate::RetryError::NilOperation) => {
                panic!("Expected Exhausted, got NilOperation");
            }
            Ok(v) => {
                panic!("Expected Exhausted, got Ok: {:?}", v);
            }
        }
    };
    ($result:expr, $attempts:expr) => {
        match $result {
            Err($crate::RetryError::Exhausted(aggregate)) => {
                assert_eq!(
                    aggregate.len(),
                    $attempts,
                    "Expected Exhausted after {} attempts, got {:?}",
                    $attempts,
                    aggregate
                );
            }
            Err($crate::RetryError::NilOperation) => {
                panic!("Expected Exhausted, got NilOperation");
            }
            Ok(v) => {
                panic!("Expected Exhausted, got Ok: {:?}", v);
            }
        }
    };
}

/// Assert that a retry run was rejected for lack of an operation.
///
/// # Example
///
/// ```rust
/// use reattempt::{assert_nil_operation, with_interval_sequence};
///
/// let missing: Option<fn(usize, usize) -> Result<(), String>> = None;
/// assert_nil_operation!(with_interval_sequence(&[], missing));
/// ```
#[macro_export]
macro_rules! assert_nil_operation {
    ($result:expr) => {
        match $result {
            Err($crate::RetryError::NilOperation) => {}
            other => {
                panic!("Expected NilOperation, got {:?}", other);
            }
        }
    };
}

#[cfg(feature = "proptest")]
use crate::IntervalSequence;
#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for IntervalSequence {
    /// Bounds on (sequence length, milliseconds per interval).
    type Parameters = (std::ops::Range<usize>, std::ops::Range<u64>);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        let (len, millis) = args;
        let len = if len.is_empty() { 0..8 } else { len };
        let millis = if millis.is_empty() { 0..3 } else { millis };
        prop::collection::vec(millis.prop_map(Duration::from_millis), len)
            .prop_map(IntervalSequence::new)
            .boxed()
    }
}

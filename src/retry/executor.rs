//! The retry executor and its attempt loop.

use std::time::{Duration, Instant};

use super::error::{AttemptFailure, ErrorAggregate, RetryError};
use super::fault;
use super::intervals::{IntervalCursor, IntervalSequence};

/// Runs an operation over an [`IntervalSequence`] until it succeeds or the
/// sequence is used up.
///
/// The executor is plain data: it owns a copy of the intervals and a flag
/// for panic containment. Running it does not change it, so one executor can
/// drive any number of independent runs, including from several threads at
/// once.
///
/// The operation receives `(attempt, limit)`: the zero-based attempt index
/// and the total number of attempts for the run (`intervals.len() + 1`).
///
/// # Examples
///
/// ```rust
/// use reattempt::RetryExecutor;
/// use std::time::Duration;
///
/// let executor = RetryExecutor::with_fixed_interval(Duration::from_millis(1), 4);
/// assert_eq!(executor.limit(), 5);
///
/// // Succeeds on the final attempt.
/// let result = executor.run(|attempt, limit| {
///     if attempt + 1 == limit {
///         Ok(attempt)
///     } else {
///         Err(format!("Error {}", attempt))
///     }
/// });
///
/// assert_eq!(result, Ok(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExecutor {
    intervals: IntervalSequence,
    contain_panics: bool,
}

/// Information about a failed attempt, passed to hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (zero-based).
    pub attempt: usize,
    /// Total number of attempts for this run.
    pub limit: usize,
    /// The failure recorded for the attempt.
    pub failure: &'a AttemptFailure<E>,
    /// Wait before the next attempt, or `None` if the run is exhausted.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first attempt started.
    pub elapsed: Duration,
}

impl<E> RetryEvent<'_, E> {
    /// Returns true if this was the final attempt of the run.
    pub fn is_final(&self) -> bool {
        self.next_delay.is_none()
    }
}

impl RetryExecutor {
    /// Create an executor that waits the given intervals between attempts.
    ///
    /// The intervals are copied; the caller's sequence stays untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reattempt::RetryExecutor;
    /// use std::time::Duration;
    ///
    /// let waits = vec![Duration::from_millis(10), Duration::from_millis(50)];
    /// let executor = RetryExecutor::with_interval_sequence(&waits[..]);
    ///
    /// assert_eq!(executor.limit(), 3);
    /// assert_eq!(waits.len(), 2);
    /// ```
    pub fn with_interval_sequence(intervals: impl Into<IntervalSequence>) -> Self {
        Self {
            intervals: intervals.into(),
            contain_panics: true,
        }
    }

    /// Create an executor that waits `interval` between attempts, `repeat` times.
    ///
    /// The operation runs at most `repeat + 1` times.
    pub fn with_fixed_interval(interval: Duration, repeat: usize) -> Self {
        Self::with_interval_sequence(IntervalSequence::fixed(interval, repeat))
    }

    /// Set whether panics inside an attempt are recorded as failures.
    ///
    /// Enabled by default. When disabled, a panicking operation unwinds
    /// straight through the executor.
    pub fn contain_panics(mut self, contain: bool) -> Self {
        self.contain_panics = contain;
        self
    }

    /// The intervals this executor waits between attempts.
    pub fn intervals(&self) -> &IntervalSequence {
        &self.intervals
    }

    /// Total number of attempts a run allows.
    pub fn limit(&self) -> usize {
        self.intervals.limit()
    }

    /// Returns true if panics inside an attempt are recorded as failures.
    pub fn contains_panics(&self) -> bool {
        self.contain_panics
    }

    /// Run the operation until it succeeds or every attempt has failed.
    ///
    /// Returns the first success, or [`RetryError::Exhausted`] holding one
    /// failure per attempt. The calling thread sleeps between attempts.
    pub fn run<T, E, F>(&self, operation: F) -> Result<T, RetryError<E>>
    where
        E: 'static,
        F: FnMut(usize, usize) -> Result<T, E>,
    {
        self.run_with_hooks(operation, |_: &RetryEvent<'_, E>| {})
    }

    /// Run an operation that may be absent.
    ///
    /// `None` is a configuration error: no attempt is made and
    /// [`RetryError::NilOperation`] is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reattempt::{IntervalSequence, RetryError, RetryExecutor};
    ///
    /// let executor = RetryExecutor::with_interval_sequence(IntervalSequence::empty());
    /// let missing: Option<fn(usize, usize) -> Result<(), String>> = None;
    ///
    /// assert_eq!(executor.run_optional(missing), Err(RetryError::NilOperation));
    /// ```
    pub fn run_optional<T, E, F>(&self, operation: Option<F>) -> Result<T, RetryError<E>>
    where
        E: 'static,
        F: FnMut(usize, usize) -> Result<T, E>,
    {
        match operation {
            Some(operation) => self.run(operation),
            None => Err(RetryError::NilOperation),
        }
    }

    /// Run the operation, calling `on_failure` after every failed attempt.
    ///
    /// The hook runs before the wait that follows the failure, and once more
    /// for the final failure of an exhausted run (with `next_delay` set to
    /// `None`). It observes the run; it cannot change it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reattempt::{RetryEvent, RetryExecutor};
    /// use std::time::Duration;
    ///
    /// let executor = RetryExecutor::with_fixed_interval(Duration::ZERO, 2);
    /// let mut seen = Vec::new();
    ///
    /// let result = executor.run_with_hooks(
    ///     |attempt, _| if attempt < 2 { Err("not yet") } else { Ok(()) },
    ///     |event: &RetryEvent<'_, &str>| seen.push((event.attempt, event.is_final())),
    /// );
    ///
    /// assert!(result.is_ok());
    /// assert_eq!(seen, vec![(0, false), (1, false)]);
    /// ```
    pub fn run_with_hooks<T, E, F, H>(
        &self,
        mut operation: F,
        mut on_failure: H,
    ) -> Result<T, RetryError<E>>
    where
        E: 'static,
        F: FnMut(usize, usize) -> Result<T, E>,
        H: FnMut(&RetryEvent<'_, E>),
    {
        let contain = self.contain_panics;
        drive(
            &self.intervals,
            |attempt, limit| {
                if contain {
                    fault::contain(|| operation(attempt, limit))
                } else {
                    operation(attempt, limit).map_err(AttemptFailure::Error)
                }
            },
            &mut on_failure,
            std::thread::sleep,
        )
    }
}

/// Run `operation` over `intervals`, waiting `interval` between attempts.
///
/// The operation runs at most `intervals.len() + 1` times. Passing `None`
/// returns [`RetryError::NilOperation`] without running anything.
///
/// # Examples
///
/// ```rust
/// use reattempt::with_interval_sequence;
/// use std::time::Duration;
///
/// let waits = [Duration::ZERO; 4];
/// let result = with_interval_sequence(
///     &waits,
///     Some(|attempt: usize, limit: usize| {
///         if attempt == limit - 1 {
///             Ok(())
///         } else {
///             Err(format!("Error {}", attempt))
///         }
///     }),
/// );
///
/// assert!(result.is_ok());
/// ```
pub fn with_interval_sequence<T, E, F>(
    intervals: &[Duration],
    operation: Option<F>,
) -> Result<T, RetryError<E>>
where
    E: 'static,
    F: FnMut(usize, usize) -> Result<T, E>,
{
    RetryExecutor::with_interval_sequence(intervals).run_optional(operation)
}

/// Run `operation` up to `repeat + 1` times, waiting `interval` between attempts.
///
/// Equivalent to [`with_interval_sequence`] over `repeat` copies of
/// `interval`.
///
/// # Examples
///
/// ```rust
/// use reattempt::with_fixed_interval;
/// use std::time::Duration;
///
/// let result = with_fixed_interval(
///     Duration::ZERO,
///     0,
///     Some(|_: usize, _: usize| Err::<(), _>("Error A")),
/// );
///
/// let aggregate = result.unwrap_err().into_aggregate().unwrap();
/// assert_eq!(aggregate.len(), 1);
/// ```
pub fn with_fixed_interval<T, E, F>(
    interval: Duration,
    repeat: usize,
    operation: Option<F>,
) -> Result<T, RetryError<E>>
where
    E: 'static,
    F: FnMut(usize, usize) -> Result<T, E>,
{
    RetryExecutor::with_fixed_interval(interval, repeat).run_optional(operation)
}

/// What the loop does after recording a failure.
pub(crate) enum Step<E> {
    /// Wait this long, then run the next attempt.
    Retry(Duration),
    /// No waits remain.
    Exhausted(ErrorAggregate<E>),
}

/// Bookkeeping for a single run: where the cursor is, which attempt is next,
/// and every failure so far.
pub(crate) struct RunState<'a, E> {
    cursor: IntervalCursor<'a>,
    limit: usize,
    attempt: usize,
    failures: Vec<AttemptFailure<E>>,
    start: Instant,
}

impl<'a, E> RunState<'a, E> {
    pub(crate) fn new(intervals: &'a IntervalSequence) -> Self {
        Self {
            cursor: intervals.cursor(),
            limit: intervals.limit(),
            attempt: 0,
            failures: Vec::with_capacity(intervals.limit()),
            start: Instant::now(),
        }
    }

    pub(crate) fn attempt(&self) -> usize {
        self.attempt
    }

    pub(crate) fn limit(&self) -> usize {
        self.limit
    }

    pub(crate) fn succeeded(&self) {
        #[cfg(feature = "tracing")]
        if self.attempt > 0 {
            tracing::debug!(
                "Retry succeeded on attempt {} of {}",
                self.attempt + 1,
                self.limit
            );
        }
    }

    /// Record the failure of the current attempt and decide what comes next.
    pub(crate) fn record<H>(&mut self, failure: AttemptFailure<E>, on_failure: &mut H) -> Step<E>
    where
        H: FnMut(&RetryEvent<'_, E>),
    {
        let next_delay = self.cursor.next_wait();

        on_failure(&RetryEvent {
            attempt: self.attempt,
            limit: self.limit,
            failure: &failure,
            next_delay,
            elapsed: self.start.elapsed(),
        });
        self.failures.push(failure);

        match next_delay {
            Some(delay) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "Attempt {} of {} failed, retrying in {:?}",
                    self.attempt + 1,
                    self.limit,
                    delay
                );
                self.attempt += 1;
                Step::Retry(delay)
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "Retry exhausted after {} attempts ({:?})",
                    self.failures.len(),
                    self.start.elapsed()
                );
                Step::Exhausted(ErrorAggregate::new(std::mem::take(&mut self.failures)))
            }
        }
    }
}

/// The synchronous attempt loop.
///
/// `wait` is only called for non-zero delays.
fn drive<T, E, F, H, W>(
    intervals: &IntervalSequence,
    mut attempt_fn: F,
    on_failure: &mut H,
    mut wait: W,
) -> Result<T, RetryError<E>>
where
    F: FnMut(usize, usize) -> Result<T, AttemptFailure<E>>,
    H: FnMut(&RetryEvent<'_, E>),
    W: FnMut(Duration),
{
    let mut state = RunState::new(intervals);

    loop {
        match attempt_fn(state.attempt(), state.limit()) {
            Ok(value) => {
                state.succeeded();
                return Ok(value);
            }
            Err(failure) => match state.record(failure, on_failure) {
                Step::Retry(delay) => {
                    if !delay.is_zero() {
                        wait(delay);
                    }
                }
                Step::Exhausted(aggregate) => return Err(RetryError::Exhausted(aggregate)),
            },
        }
    }
}

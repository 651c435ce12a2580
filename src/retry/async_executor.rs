//! Async attempt loop.
//!
//! Same semantics as [`RetryExecutor::run`], but each attempt is a future and
//! the waits suspend the task with `tokio::time::sleep` instead of blocking
//! the thread.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;

use super::error::{AttemptFailure, RetryError};
use super::executor::{RetryEvent, RetryExecutor, RunState, Step};
use super::fault;

impl RetryExecutor {
    /// Run an async operation until it succeeds or every attempt has failed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reattempt::RetryExecutor;
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let executor = RetryExecutor::with_fixed_interval(Duration::from_millis(1), 2);
    ///
    /// let result = executor
    ///     .run_async(|attempt, _limit| async move {
    ///         if attempt == 2 {
    ///             Ok("connected")
    ///         } else {
    ///             Err("connection refused")
    ///         }
    ///     })
    ///     .await;
    ///
    /// assert_eq!(result, Ok("connected"));
    /// # });
    /// ```
    pub async fn run_async<T, E, F, Fut>(&self, operation: F) -> Result<T, RetryError<E>>
    where
        E: 'static,
        F: FnMut(usize, usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_async_with_hooks(operation, |_: &RetryEvent<'_, E>| {})
            .await
    }

    /// Run an async operation, calling `on_failure` after every failed attempt.
    ///
    /// Panics raised while building or polling an attempt's future are
    /// contained the same way as in the synchronous loop.
    pub async fn run_async_with_hooks<T, E, F, Fut, H>(
        &self,
        mut operation: F,
        mut on_failure: H,
    ) -> Result<T, RetryError<E>>
    where
        E: 'static,
        F: FnMut(usize, usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        H: FnMut(&RetryEvent<'_, E>),
    {
        let mut state = RunState::new(self.intervals());

        loop {
            let (attempt, limit) = (state.attempt(), state.limit());
            let outcome = if self.contains_panics() {
                contained_attempt(|| operation(attempt, limit)).await
            } else {
                operation(attempt, limit)
                    .await
                    .map_err(AttemptFailure::Error)
            };

            match outcome {
                Ok(value) => {
                    state.succeeded();
                    return Ok(value);
                }
                Err(failure) => match state.record(failure, &mut on_failure) {
                    Step::Retry(delay) => {
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                    Step::Exhausted(aggregate) => return Err(RetryError::Exhausted(aggregate)),
                },
            }
        }
    }
}

async fn contained_attempt<T, E, Fut>(
    make_attempt: impl FnOnce() -> Fut,
) -> Result<T, AttemptFailure<E>>
where
    E: 'static,
    Fut: Future<Output = Result<T, E>>,
{
    let future = match panic::catch_unwind(AssertUnwindSafe(make_attempt)) {
        Ok(future) => future,
        Err(payload) => return Err(fault::classify(payload)),
    };

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result.map_err(AttemptFailure::Error),
        Err(payload) => Err(fault::classify(payload)),
    }
}

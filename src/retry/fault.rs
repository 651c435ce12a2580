//! Panic containment for individual attempts.
//!
//! A panic inside one attempt must not tear down the whole run. Each attempt
//! runs under [`std::panic::catch_unwind`] and the panic payload is turned
//! into an [`AttemptFailure`] for that attempt.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::error::AttemptFailure;

/// Message recorded for panic payloads that carry no readable text.
pub(crate) const OPAQUE_PANIC: &str = "opaque panic payload";

/// Run one attempt, converting a panic into a recorded failure.
///
/// The closure is treated as unwind safe: the loop never observes state the
/// operation left half-updated, it only records the failure and moves on.
pub(crate) fn contain<T, E, F>(attempt: F) -> Result<T, AttemptFailure<E>>
where
    E: 'static,
    F: FnOnce() -> Result<T, E>,
{
    match panic::catch_unwind(AssertUnwindSafe(attempt)) {
        Ok(result) => result.map_err(AttemptFailure::Error),
        Err(payload) => Err(classify(payload)),
    }
}

/// Turn a panic payload into the failure recorded for the attempt.
///
/// - A payload of the operation's error type is recorded as that error.
/// - `&'static str` and `String` payloads (what `panic!` produces) keep their text.
/// - A boxed `std::error::Error` keeps its display text.
/// - Anything else is recorded as an opaque panic.
pub(crate) fn classify<E: 'static>(payload: Box<dyn Any + Send>) -> AttemptFailure<E> {
    let payload = match payload.downcast::<E>() {
        Ok(error) => return AttemptFailure::Error(*error),
        Err(payload) => payload,
    };

    let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(e) = payload.downcast_ref::<Box<dyn std::error::Error + Send + Sync>>() {
        e.to_string()
    } else {
        OPAQUE_PANIC.to_string()
    };

    #[cfg(feature = "tracing")]
    tracing::warn!("Contained panic in retry attempt: {}", message);

    AttemptFailure::Panic(message)
}

//! Error types for retry operations.

use std::fmt;

/// The failure recorded for a single attempt.
///
/// An attempt fails either by returning an error or by panicking. A panic
/// whose payload is the operation's own error type is recorded as
/// [`AttemptFailure::Error`], exactly as if the error had been returned.
/// Any other panic payload is recorded as [`AttemptFailure::Panic`] with a
/// best-effort message.
///
/// # Examples
///
/// ```rust
/// use reattempt::AttemptFailure;
///
/// let returned: AttemptFailure<&str> = AttemptFailure::Error("connection refused");
/// assert!(!returned.is_panic());
/// assert_eq!(returned.as_error(), Some(&"connection refused"));
///
/// let panicked: AttemptFailure<&str> = AttemptFailure::Panic("index out of bounds".to_string());
/// assert!(panicked.is_panic());
/// assert_eq!(panicked.to_string(), "attempt panicked: index out of bounds");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure<E> {
    /// The operation returned an error, or panicked with an error of its own type.
    Error(E),
    /// The operation panicked with a payload that is not its error type.
    Panic(String),
}

impl<E> AttemptFailure<E> {
    /// Returns true if this attempt ended in a non-error panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panic(_))
    }

    /// Get the operation's error, if this failure carries one.
    pub fn as_error(&self) -> Option<&E> {
        match self {
            Self::Error(e) => Some(e),
            Self::Panic(_) => None,
        }
    }

    /// Extract the operation's error, if this failure carries one.
    pub fn into_error(self) -> Option<E> {
        match self {
            Self::Error(e) => Some(e),
            Self::Panic(_) => None,
        }
    }

    /// Get the panic message, if this failure is a non-error panic.
    pub fn panic_message(&self) -> Option<&str> {
        match self {
            Self::Error(_) => None,
            Self::Panic(message) => Some(message),
        }
    }
}

impl<E: fmt::Display> fmt::Display for AttemptFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(e) => write!(f, "{}", e),
            Self::Panic(message) => write!(f, "attempt panicked: {}", message),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for AttemptFailure<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Error(e) => Some(e),
            Self::Panic(_) => None,
        }
    }
}

/// Every failure from an exhausted run, in the order the attempts happened.
///
/// The retry loop only builds an aggregate when every attempt failed, so an
/// aggregate it returns always holds one failure per attempt and is never
/// empty.
///
/// # Examples
///
/// ```rust
/// use reattempt::with_interval_sequence;
/// use std::time::Duration;
///
/// let result = with_interval_sequence(
///     &[Duration::ZERO, Duration::ZERO],
///     Some(|attempt: usize, _limit: usize| Err::<(), _>(format!("Error {}", attempt))),
/// );
///
/// let aggregate = result.unwrap_err().into_aggregate().unwrap();
/// assert_eq!(aggregate.len(), 3);
///
/// let messages: Vec<_> = aggregate.errors().cloned().collect();
/// assert_eq!(messages, vec!["Error 0", "Error 1", "Error 2"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorAggregate<E> {
    failures: Vec<AttemptFailure<E>>,
}

impl<E> ErrorAggregate<E> {
    /// Build an aggregate from failures in attempt order.
    pub fn new(failures: Vec<AttemptFailure<E>>) -> Self {
        Self { failures }
    }

    /// Number of recorded failures.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// All failures in attempt order.
    pub fn failures(&self) -> &[AttemptFailure<E>] {
        &self.failures
    }

    /// Iterate over the failures in attempt order.
    pub fn iter(&self) -> std::slice::Iter<'_, AttemptFailure<E>> {
        self.failures.iter()
    }

    /// The failure from the first attempt.
    pub fn first(&self) -> Option<&AttemptFailure<E>> {
        self.failures.first()
    }

    /// The failure from the final attempt.
    pub fn last(&self) -> Option<&AttemptFailure<E>> {
        self.failures.last()
    }

    /// Iterate over the operation's own errors, skipping non-error panics.
    pub fn errors(&self) -> impl Iterator<Item = &E> + '_ {
        self.failures.iter().filter_map(AttemptFailure::as_error)
    }

    /// Number of attempts that ended in a non-error panic.
    pub fn panics(&self) -> usize {
        self.failures.iter().filter(|f| f.is_panic()).count()
    }

    /// Extract the failures, discarding the aggregate.
    pub fn into_failures(self) -> Vec<AttemptFailure<E>> {
        self.failures
    }
}

impl<E> From<Vec<AttemptFailure<E>>> for ErrorAggregate<E> {
    fn from(failures: Vec<AttemptFailure<E>>) -> Self {
        Self::new(failures)
    }
}

impl<E> IntoIterator for ErrorAggregate<E> {
    type Item = AttemptFailure<E>;
    type IntoIter = std::vec::IntoIter<AttemptFailure<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a ErrorAggregate<E> {
    type Item = &'a AttemptFailure<E>;
    type IntoIter = std::slice::Iter<'a, AttemptFailure<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}

impl<E: fmt::Display> fmt::Display for ErrorAggregate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "retry exhausted after {} attempts", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, failure)?;
        }
        Ok(())
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ErrorAggregate<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .last()
            .map(|f| f as &(dyn std::error::Error + 'static))
    }
}

/// Error returned by a retry run.
///
/// Only two outcomes ever leave the retry loop: the operation was absent, so
/// nothing ran, or every attempt failed.
///
/// # Examples
///
/// ```rust
/// use reattempt::{with_fixed_interval, RetryError};
/// use std::time::Duration;
///
/// let missing: Option<fn(usize, usize) -> Result<(), String>> = None;
/// let result = with_fixed_interval(Duration::from_millis(1), 3, missing);
///
/// assert_eq!(result, Err(RetryError::NilOperation));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// No operation was supplied. Zero attempts were made.
    NilOperation,
    /// Every attempt failed.
    Exhausted(ErrorAggregate<E>),
}

impl<E> RetryError<E> {
    /// Returns true if the run was rejected for lack of an operation.
    pub fn is_nil_operation(&self) -> bool {
        matches!(self, Self::NilOperation)
    }

    /// Returns true if every attempt failed.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    /// Get the aggregate of failures, if the run was exhausted.
    pub fn aggregate(&self) -> Option<&ErrorAggregate<E>> {
        match self {
            Self::Exhausted(aggregate) => Some(aggregate),
            Self::NilOperation => None,
        }
    }

    /// Extract the aggregate of failures, if the run was exhausted.
    pub fn into_aggregate(self) -> Option<ErrorAggregate<E>> {
        match self {
            Self::Exhausted(aggregate) => Some(aggregate),
            Self::NilOperation => None,
        }
    }
}

impl<E> From<ErrorAggregate<E>> for RetryError<E> {
    fn from(aggregate: ErrorAggregate<E>) -> Self {
        Self::Exhausted(aggregate)
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NilOperation => write!(f, "retry operation must not be absent"),
            Self::Exhausted(aggregate) => write!(f, "{}", aggregate),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NilOperation => None,
            Self::Exhausted(aggregate) => Some(aggregate),
        }
    }
}

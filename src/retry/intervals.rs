//! Interval sequences: the ordered waits between consecutive attempts.

use std::time::Duration;

/// An ordered sequence of wait durations, one per gap between attempts.
///
/// A sequence of length `N` allows `N + 1` attempts: the final attempt has
/// no wait after it. An empty sequence means exactly one attempt and no
/// waiting.
///
/// Sequences are pure data. The executor owns its own copy and walks it
/// with an [`IntervalCursor`], so the sequence a caller builds is never
/// consumed or mutated by running it.
///
/// # Examples
///
/// ```rust
/// use reattempt::IntervalSequence;
/// use std::time::Duration;
///
/// let intervals = IntervalSequence::from_millis(&[10, 20, 40]);
///
/// assert_eq!(intervals.len(), 3);
/// assert_eq!(intervals.limit(), 4);
/// assert_eq!(intervals.total_delay(), Duration::from_millis(70));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IntervalSequence {
    intervals: Vec<Duration>,
}

impl IntervalSequence {
    /// Create a sequence from explicit durations, in the order they will be waited.
    pub fn new(intervals: Vec<Duration>) -> Self {
        Self { intervals }
    }

    /// A sequence with no waits: the operation runs exactly once.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A sequence of `repeat` copies of `interval`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reattempt::IntervalSequence;
    /// use std::time::Duration;
    ///
    /// let intervals = IntervalSequence::fixed(Duration::from_millis(5), 3);
    /// assert_eq!(intervals.as_slice(), &[Duration::from_millis(5); 3]);
    ///
    /// // Zero repeats is the single-attempt sequence.
    /// assert!(IntervalSequence::fixed(Duration::from_secs(1), 0).is_empty());
    /// ```
    pub fn fixed(interval: Duration, repeat: usize) -> Self {
        Self {
            intervals: vec![interval; repeat],
        }
    }

    /// Build a sequence from millisecond values.
    pub fn from_millis(millis: &[u64]) -> Self {
        millis.iter().copied().map(Duration::from_millis).collect()
    }

    /// Number of waits in the sequence.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns true when the sequence has no waits.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Total number of attempts a run over this sequence allows.
    ///
    /// Always `len() + 1`.
    pub fn limit(&self) -> usize {
        self.intervals.len() + 1
    }

    /// The waits as a slice.
    pub fn as_slice(&self) -> &[Duration] {
        &self.intervals
    }

    /// Iterate over the waits front to back.
    pub fn iter(&self) -> std::slice::Iter<'_, Duration> {
        self.intervals.iter()
    }

    /// Sum of every wait in the sequence.
    ///
    /// This is the time a run spends sleeping when every attempt but the
    /// last one fails.
    pub fn total_delay(&self) -> Duration {
        self.intervals.iter().sum()
    }

    /// A cursor that hands out the waits one at a time, front to back.
    pub fn cursor(&self) -> IntervalCursor<'_> {
        IntervalCursor {
            intervals: &self.intervals,
            position: 0,
        }
    }
}

impl From<Vec<Duration>> for IntervalSequence {
    fn from(intervals: Vec<Duration>) -> Self {
        Self::new(intervals)
    }
}

impl From<&[Duration]> for IntervalSequence {
    fn from(intervals: &[Duration]) -> Self {
        Self::new(intervals.to_vec())
    }
}

impl<const N: usize> From<[Duration; N]> for IntervalSequence {
    fn from(intervals: [Duration; N]) -> Self {
        Self::new(intervals.to_vec())
    }
}

impl From<&IntervalSequence> for IntervalSequence {
    fn from(intervals: &IntervalSequence) -> Self {
        intervals.clone()
    }
}

impl FromIterator<Duration> for IntervalSequence {
    fn from_iter<I: IntoIterator<Item = Duration>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IntervalSequence {
    type Item = &'a Duration;
    type IntoIter = std::slice::Iter<'a, Duration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front-to-back reader over an [`IntervalSequence`].
///
/// Consumption only advances the cursor; the underlying sequence is left
/// intact.
///
/// # Examples
///
/// ```rust
/// use reattempt::IntervalSequence;
/// use std::time::Duration;
///
/// let intervals = IntervalSequence::from_millis(&[1, 2]);
/// let mut cursor = intervals.cursor();
///
/// assert_eq!(cursor.next_wait(), Some(Duration::from_millis(1)));
/// assert_eq!(cursor.remaining(), 1);
/// assert_eq!(cursor.next_wait(), Some(Duration::from_millis(2)));
/// assert_eq!(cursor.next_wait(), None);
///
/// // The sequence itself is untouched.
/// assert_eq!(intervals.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct IntervalCursor<'a> {
    intervals: &'a [Duration],
    position: usize,
}

impl IntervalCursor<'_> {
    /// Take the next wait, or `None` once the sequence is used up.
    pub fn next_wait(&mut self) -> Option<Duration> {
        let wait = self.intervals.get(self.position).copied()?;
        self.position += 1;
        Some(wait)
    }

    /// Peek at the next wait without consuming it.
    pub fn peek(&self) -> Option<Duration> {
        self.intervals.get(self.position).copied()
    }

    /// Number of waits not yet consumed.
    pub fn remaining(&self) -> usize {
        self.intervals.len() - self.position
    }

    /// Returns true once every wait has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod interval_tests {
    use super::*;

    #[test]
    fn test_empty_sequence_allows_one_attempt() {
        let intervals = IntervalSequence::empty();
        assert!(intervals.is_empty());
        assert_eq!(intervals.limit(), 1);
        assert_eq!(intervals.total_delay(), Duration::ZERO);
        assert!(intervals.cursor().is_exhausted());
    }

    #[test]
    fn test_fixed_repeats_interval() {
        let intervals = IntervalSequence::fixed(Duration::from_millis(3), 4);
        assert_eq!(intervals.len(), 4);
        assert_eq!(intervals.limit(), 5);
        assert!(intervals.iter().all(|d| *d == Duration::from_millis(3)));
        assert_eq!(intervals.total_delay(), Duration::from_millis(12));
    }

    #[test]
    fn test_conversions_preserve_order() {
        let raw = [
            Duration::from_millis(1),
            Duration::from_millis(5),
            Duration::from_millis(2),
        ];

        let from_array = IntervalSequence::from(raw);
        let from_slice = IntervalSequence::from(&raw[..]);
        let from_vec = IntervalSequence::from(raw.to_vec());
        let collected: IntervalSequence = raw.iter().copied().collect();

        assert_eq!(from_array.as_slice(), &raw);
        assert_eq!(from_array, from_slice);
        assert_eq!(from_slice, from_vec);
        assert_eq!(from_vec, collected);
    }

    #[test]
    fn test_cursor_consumes_front_to_back() {
        let intervals = IntervalSequence::from_millis(&[0, 7]);
        let mut cursor = intervals.cursor();

        assert_eq!(cursor.remaining(), 2);
        assert_eq!(cursor.peek(), Some(Duration::ZERO));
        assert_eq!(cursor.next_wait(), Some(Duration::ZERO));
        assert_eq!(cursor.peek(), Some(Duration::from_millis(7)));
        assert_eq!(cursor.next_wait(), Some(Duration::from_millis(7)));
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.next_wait(), None);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_independent_cursors() {
        let intervals = IntervalSequence::from_millis(&[1, 2, 3]);
        let mut first = intervals.cursor();
        first.next_wait();
        first.next_wait();

        let second = intervals.cursor();
        assert_eq!(first.remaining(), 1);
        assert_eq!(second.remaining(), 3);
    }
}

//! Serde support for interval sequences (feature-gated)
//!
//! An [`IntervalSequence`] serializes as a list of whole milliseconds, which
//! keeps retry schedules readable in configuration files. Sub-millisecond
//! precision is truncated on serialization.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde::Deserialize;
//! use reattempt::IntervalSequence;
//!
//! #[derive(Deserialize)]
//! struct UploadConfig {
//!     retry_intervals: IntervalSequence,
//! }
//!
//! let config: UploadConfig = serde_json::from_str(r#"{"retry_intervals": [100, 250, 1000]}"#).unwrap();
//! assert_eq!(config.retry_intervals.limit(), 4);
//! ```

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

use super::intervals::IntervalSequence;

impl Serialize for IntervalSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for interval in self {
            let millis = u64::try_from(interval.as_millis()).map_err(serde::ser::Error::custom)?;
            seq.serialize_element(&millis)?;
        }
        seq.end()
    }
}

struct MillisVisitor;

impl<'de> Visitor<'de> for MillisVisitor {
    type Value = IntervalSequence;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a list of wait intervals in milliseconds")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut intervals = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(millis) = seq.next_element::<u64>()? {
            intervals.push(Duration::from_millis(millis));
        }
        Ok(IntervalSequence::new(intervals))
    }
}

impl<'de> Deserialize<'de> for IntervalSequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(MillisVisitor)
    }
}

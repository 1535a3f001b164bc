//! Logical time: timestamps, TTLs and time ranges

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical timestamp supplied by the caller of every store operation.
///
/// Timestamps are opaque ticks; the store never consults a wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp {
    ticks: i64,
}

impl Timestamp {
    /// Earliest representable timestamp
    pub const MIN: Timestamp = Timestamp { ticks: i64::MIN };
    /// Latest representable timestamp
    pub const MAX: Timestamp = Timestamp { ticks: i64::MAX };

    /// Create a timestamp from raw ticks
    pub const fn new(ticks: i64) -> Self {
        Self { ticks }
    }

    /// Get the raw tick count
    pub const fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Add a TTL, saturating at [`Timestamp::MAX`]
    pub fn saturating_add(&self, ttl: Ttl) -> Self {
        let ticks = i64::try_from(ttl.ticks())
            .map(|t| self.ticks.saturating_add(t))
            .unwrap_or(i64::MAX);
        Self { ticks }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ticks)
    }
}

impl From<i64> for Timestamp {
    fn from(ticks: i64) -> Self {
        Self { ticks }
    }
}

/// Time-to-live measured in the same ticks as [`Timestamp`].
///
/// Unsigned so a negative TTL cannot reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ttl {
    ticks: u64,
}

impl Ttl {
    /// A TTL of zero: the write is invisible even at its own timestamp
    pub const ZERO: Ttl = Ttl { ticks: 0 };

    pub const fn new(ticks: u64) -> Self {
        Self { ticks }
    }

    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl From<u64> for Ttl {
    fn from(ticks: u64) -> Self {
        Self { ticks }
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ticks)
    }
}

/// Half-open time range `[start, end)`; an `end` of `None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Option<Timestamp>,
}

impl TimeRange {
    /// Create a range `[start, end)`
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Range `[start, ..)` with no upper bound
    pub fn since(start: Timestamp) -> Self {
        Self { start, end: None }
    }

    /// Range covering all of logical time, [`Timestamp::MAX`] included
    pub fn all() -> Self {
        Self::since(Timestamp::MIN)
    }

    /// Check if a timestamp falls inside the range
    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && self.end.map_or(true, |end| ts < end)
    }

    /// True when the range can contain no timestamp
    pub fn is_empty(&self) -> bool {
        self.end.map_or(false, |end| self.start >= end)
    }
}

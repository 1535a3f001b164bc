//! Versions: immutable records of a single write to one field

use crate::core::temporal::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-wide insertion counter used to order writes sharing a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(pub u64);

impl Sequence {
    pub const MIN: Sequence = Sequence(0);
    pub const MAX: Sequence = Sequence(u64::MAX);
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a version in its field log.
///
/// Ordered by effective timestamp first, then by sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionKey {
    pub effective: Timestamp,
    pub sequence: Sequence,
}

impl VersionKey {
    pub fn new(effective: Timestamp, sequence: Sequence) -> Self {
        Self {
            effective,
            sequence,
        }
    }

    /// Greatest key with the given effective timestamp
    pub fn ceiling_of(effective: Timestamp) -> Self {
        Self::new(effective, Sequence::MAX)
    }

    /// Smallest key with the given effective timestamp
    pub fn floor_of(effective: Timestamp) -> Self {
        Self::new(effective, Sequence::MIN)
    }
}

/// What a version records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    /// A written value (possibly the empty string)
    Value(String),
    /// A deletion marker
    Tombstone,
}

impl VersionKind {
    #[inline]
    pub fn is_tombstone(&self) -> bool {
        matches!(self, VersionKind::Tombstone)
    }

    /// The payload, if this is a value
    #[inline]
    pub fn value(&self) -> Option<&str> {
        match self {
            VersionKind::Value(v) => Some(v),
            VersionKind::Tombstone => None,
        }
    }
}

/// One immutable write to a (key, field) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Logical time the write is attributed to
    pub effective: Timestamp,
    /// Tie-breaker among versions with the same effective timestamp
    pub sequence: Sequence,
    pub kind: VersionKind,
    /// Queries at or after this timestamp do not see the version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

impl Version {
    /// Create a value version
    pub fn value(
        effective: Timestamp,
        sequence: Sequence,
        value: String,
        expires_at: Option<Timestamp>,
    ) -> Self {
        Self {
            effective,
            sequence,
            kind: VersionKind::Value(value),
            expires_at,
        }
    }

    /// Create a tombstone version
    pub fn tombstone(effective: Timestamp, sequence: Sequence) -> Self {
        Self {
            effective,
            sequence,
            kind: VersionKind::Tombstone,
            expires_at: None,
        }
    }

    pub fn key(&self) -> VersionKey {
        VersionKey::new(self.effective, self.sequence)
    }

    #[inline]
    pub fn is_tombstone(&self) -> bool {
        self.kind.is_tombstone()
    }

    /// True once `ts` has reached the version's expiry
    #[inline]
    pub fn is_expired_at(&self, ts: Timestamp) -> bool {
        self.expires_at.map(|at| ts >= at).unwrap_or(false)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} ", self.effective, self.sequence)?;
        match &self.kind {
            VersionKind::Value(v) => write!(f, "{v}")?,
            VersionKind::Tombstone => write!(f, "<tombstone>")?,
        }
        if let Some(at) = self.expires_at {
            write!(f, " expires={at}")?;
        }
        Ok(())
    }
}

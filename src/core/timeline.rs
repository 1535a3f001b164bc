//! Field log: the ordered version history of a single (key, field) pair

use crate::core::temporal::{TimeRange, Timestamp};
use crate::core::version::{Sequence, Version, VersionKey, VersionKind};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Complete history of one field.
///
/// Versions are keyed by `(effective timestamp, sequence)`, so writes may land
/// anywhere in history, not only at the end. Nothing is ever removed; a
/// delete is recorded as a tombstone version.
#[derive(Debug, Clone, Default)]
pub struct FieldLog {
    versions: BTreeMap<VersionKey, Version>,
}

impl FieldLog {
    /// Create an empty field log
    pub fn new() -> Self {
        Self {
            versions: BTreeMap::new(),
        }
    }

    /// Record a write attributed to `effective`.
    ///
    /// `sequence` must be unique across the log; a higher sequence wins over
    /// a lower one at the same effective timestamp.
    pub fn insert(
        &mut self,
        effective: Timestamp,
        sequence: Sequence,
        kind: VersionKind,
        expires_at: Option<Timestamp>,
    ) -> &Version {
        let version = Version {
            effective,
            sequence,
            kind,
            expires_at,
        };
        let key = version.key();
        self.versions.entry(key).or_insert(version)
    }

    /// Latest version whose effective timestamp is at or before `ts`
    pub fn floor(&self, ts: Timestamp) -> Option<&Version> {
        self.versions
            .range(..=VersionKey::ceiling_of(ts))
            .next_back()
            .map(|(_, version)| version)
    }

    /// Versions with an effective timestamp inside `range`
    pub fn versions_in_range(&self, range: TimeRange) -> Vec<&Version> {
        if range.is_empty() {
            return Vec::new();
        }
        let upper = match range.end {
            Some(end) => Bound::Excluded(VersionKey::floor_of(end)),
            None => Bound::Unbounded,
        };
        self.versions
            .range((Bound::Included(VersionKey::floor_of(range.start)), upper))
            .map(|(_, version)| version)
            .collect()
    }

    /// All versions in history order
    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.versions.values()
    }

    /// Number of versions, tombstones included
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Number of tombstone versions
    pub fn tombstones(&self) -> usize {
        self.versions.values().filter(|v| v.is_tombstone()).count()
    }

    /// Earliest effective timestamp (if any)
    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.versions.first_key_value().map(|(key, _)| key.effective)
    }

    /// Latest effective timestamp (if any)
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.versions.last_key_value().map(|(key, _)| key.effective)
    }
}

//! Command engine: the public operations of the temporal field store

use crate::config::StoreConfig;
use crate::core::temporal::{TimeRange, Timestamp, Ttl};
use crate::core::version::{Sequence, Version, VersionKind};
use crate::core::visibility::visible;
use crate::error::Result;
use crate::storage::{FieldHandle, RecordDirectory};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Counters describing everything the store holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Keys ever written
    pub keys: usize,
    /// Fields ever written, across all keys
    pub fields: usize,
    /// Versions, tombstones included
    pub versions: usize,
    /// Tombstone versions
    pub tombstones: usize,
}

/// In-memory multi-version key/field store.
///
/// Every operation takes the caller's logical timestamp. Reads resolve the
/// floor version at that timestamp and apply tombstone and TTL rules;
/// writes append a new version and never discard history.
#[derive(Debug)]
pub struct TemporalStore {
    directory: RecordDirectory,
    /// Last issued sequence number
    sequence: AtomicU64,
}

impl TemporalStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            directory: RecordDirectory::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Create an empty store from `config`, rejecting an invalid shard count
    pub fn with_config(config: &StoreConfig) -> Result<Self> {
        Ok(Self {
            directory: RecordDirectory::with_config(config)?,
            sequence: AtomicU64::new(0),
        })
    }

    fn next_sequence(&self) -> Sequence {
        Sequence(self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Unconditionally append a version at `effective`
    fn write(
        &self,
        key: &str,
        field: &str,
        effective: Timestamp,
        kind: VersionKind,
        expires_at: Option<Timestamp>,
    ) {
        let handle = self.directory.field_log_or_create(key, field);
        let mut log = handle.lock();
        let sequence = self.next_sequence();
        let version = log.insert(effective, sequence, kind, expires_at);
        debug!(
            key,
            field,
            effective = effective.ticks(),
            sequence = sequence.0,
            tombstone = version.is_tombstone(),
            expires_at = ?expires_at.map(|t| t.ticks()),
            "version written"
        );
    }

    /// Append a version at `ts` if the value visible at `ts` equals `expected`.
    ///
    /// The field's lock is held across the comparison and the insert.
    fn compare_and_write(
        &self,
        ts: Timestamp,
        key: &str,
        field: &str,
        expected: Option<&str>,
        kind: VersionKind,
        expires_at: Option<Timestamp>,
    ) -> bool {
        // A missing field can only match an absent expectation, so only
        // that case may register a new field.
        let handle = match expected {
            None => self.directory.field_log_or_create(key, field),
            Some(_) => match self.directory.field_log(key, field) {
                Some(handle) => handle,
                None => {
                    debug!(key, field, ts = ts.ticks(), "compare failed: field missing");
                    return false;
                }
            },
        };

        let mut log = handle.lock();
        let current = visible(log.floor(ts), ts);
        if current != expected {
            debug!(
                key,
                field,
                ts = ts.ticks(),
                ?expected,
                ?current,
                "compare failed"
            );
            return false;
        }

        let sequence = self.next_sequence();
        let version = log.insert(ts, sequence, kind, expires_at);
        debug!(
            key,
            field,
            effective = ts.ticks(),
            sequence = sequence.0,
            tombstone = version.is_tombstone(),
            expires_at = ?expires_at.map(|t| t.ticks()),
            "conditional version written"
        );
        true
    }

    fn read(&self, key: &str, field: &str, at: Timestamp) -> Option<String> {
        let value = self.directory.field_log(key, field).and_then(|handle| {
            let log = handle.lock();
            visible(log.floor(at), at).map(str::to_owned)
        });
        trace!(key, field, at = at.ticks(), found = value.is_some(), "read");
        value
    }

    /// Resolve each field at `at`, dropping the ones that are absent.
    ///
    /// Fields are locked one at a time; a scan is not atomic across fields.
    fn visible_entries(&self, at: Timestamp, fields: Vec<(String, FieldHandle)>) -> Vec<(String, String)> {
        fields
            .into_iter()
            .filter_map(|(name, handle)| {
                let log = handle.lock();
                let value = visible(log.floor(at), at).map(str::to_owned);
                value.map(|v| (name, v))
            })
            .collect()
    }

    /// Set `field` of `key` to `value` from `ts` onwards, without a TTL
    pub fn set(&self, ts: Timestamp, key: &str, field: &str, value: &str) {
        self.write(key, field, ts, VersionKind::Value(value.to_string()), None);
    }

    /// Value of `field` of `key` visible at `ts`
    pub fn get(&self, ts: Timestamp, key: &str, field: &str) -> Option<String> {
        self.read(key, field, ts)
    }

    /// Set `field` to `new_value` if its visible value at `ts` equals `expected`.
    ///
    /// `expected = None` matches only a field that is absent at `ts` (never
    /// written, deleted or expired). Returns whether the write was applied.
    pub fn compare_and_set(
        &self,
        ts: Timestamp,
        key: &str,
        field: &str,
        expected: Option<&str>,
        new_value: &str,
    ) -> bool {
        self.compare_and_write(
            ts,
            key,
            field,
            expected,
            VersionKind::Value(new_value.to_string()),
            None,
        )
    }

    /// Delete `field` at `ts` if its visible value equals `expected`.
    ///
    /// The delete is recorded as a tombstone; earlier history stays readable.
    pub fn compare_and_delete(
        &self,
        ts: Timestamp,
        key: &str,
        field: &str,
        expected: Option<&str>,
    ) -> bool {
        self.compare_and_write(ts, key, field, expected, VersionKind::Tombstone, None)
    }

    /// Set `field` to `value` at `ts`, visible until `ts + ttl` (exclusive)
    pub fn set_with_ttl(&self, ts: Timestamp, key: &str, field: &str, value: &str, ttl: Ttl) {
        self.write(
            key,
            field,
            ts,
            VersionKind::Value(value.to_string()),
            Some(ts.saturating_add(ttl)),
        );
    }

    /// [`compare_and_set`](Self::compare_and_set) whose new value expires at `ts + ttl`
    pub fn compare_and_set_with_ttl(
        &self,
        ts: Timestamp,
        key: &str,
        field: &str,
        expected: Option<&str>,
        new_value: &str,
        ttl: Ttl,
    ) -> bool {
        self.compare_and_write(
            ts,
            key,
            field,
            expected,
            VersionKind::Value(new_value.to_string()),
            Some(ts.saturating_add(ttl)),
        )
    }

    /// Record `value` as if it had been written at `set_ts`.
    ///
    /// `now` is the arrival time of the call and is not stored; ordering
    /// among writes sharing `set_ts` follows call order.
    pub fn set_at(&self, now: Timestamp, key: &str, field: &str, value: &str, set_ts: Timestamp) {
        trace!(key, field, now = now.ticks(), set_ts = set_ts.ticks(), "set_at");
        self.write(key, field, set_ts, VersionKind::Value(value.to_string()), None);
    }

    /// Value of `field` as it was at `query_ts`.
    ///
    /// `now` is the arrival time of the call and does not affect the result.
    pub fn get_at(&self, now: Timestamp, key: &str, field: &str, query_ts: Timestamp) -> Option<String> {
        trace!(key, field, now = now.ticks(), query_ts = query_ts.ticks(), "get_at");
        self.read(key, field, query_ts)
    }

    /// Visible `(field, value)` pairs of `key` at `ts`, sorted by field name
    pub fn scan_entries(&self, ts: Timestamp, key: &str) -> Vec<(String, String)> {
        match self.directory.record(key) {
            Some(record) => self.visible_entries(ts, record.entries()),
            None => Vec::new(),
        }
    }

    /// Like [`scan_entries`](Self::scan_entries), limited to fields starting with `prefix`
    pub fn scan_by_prefix_entries(&self, ts: Timestamp, key: &str, prefix: &str) -> Vec<(String, String)> {
        match self.directory.record(key) {
            Some(record) => self.visible_entries(ts, record.entries_with_prefix(prefix)),
            None => Vec::new(),
        }
    }

    /// Visible fields of `key` at `ts` as `"field(value)"`, sorted by field name
    pub fn scan(&self, ts: Timestamp, key: &str) -> Vec<String> {
        format_entries(self.scan_entries(ts, key))
    }

    /// Visible fields of `key` at `ts` whose name starts with `prefix`,
    /// as `"field(value)"`, sorted by field name
    pub fn scan_by_prefix(&self, ts: Timestamp, key: &str, prefix: &str) -> Vec<String> {
        format_entries(self.scan_by_prefix_entries(ts, key, prefix))
    }

    /// Every version of a field, oldest first
    pub fn history(&self, key: &str, field: &str) -> Vec<Version> {
        match self.directory.field_log(key, field) {
            Some(handle) => {
                let log = handle.lock();
                log.iter().cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Versions of a field whose effective timestamp lies in `range`
    pub fn history_between(&self, key: &str, field: &str, range: TimeRange) -> Vec<Version> {
        match self.directory.field_log(key, field) {
            Some(handle) => {
                let log = handle.lock();
                log.versions_in_range(range).into_iter().cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Every key ever written, sorted ascending
    pub fn keys(&self) -> Vec<String> {
        self.directory.keys()
    }

    /// Size counters for the whole store
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats::default();
        for (_, record) in self.directory.records() {
            stats.keys += 1;
            for (_, handle) in record.entries() {
                let log = handle.lock();
                stats.fields += 1;
                stats.versions += log.len();
                stats.tombstones += log.tombstones();
            }
        }
        stats
    }
}

impl Default for TemporalStore {
    fn default() -> Self {
        Self::new()
    }
}

fn format_entries(entries: Vec<(String, String)>) -> Vec<String> {
    entries
        .into_iter()
        .map(|(field, value)| format!("{field}({value})"))
        .collect()
}

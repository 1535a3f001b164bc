//! Record directory: `key -> field -> FieldLog`.
//!
//! The outer level is a sharded concurrent map so unrelated keys never share
//! a lock. Each record keeps its fields in a `BTreeMap`, giving sorted scans
//! and range-based prefix lookups. Every field log sits behind its own mutex;
//! holding that mutex is what makes a read-compare-insert on one field
//! indivisible.

use crate::config::StoreConfig;
use crate::core::timeline::FieldLog;
use crate::error::Result;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared handle to one field's history
pub type FieldHandle = Arc<Mutex<FieldLog>>;

/// Field names written for one key, each with its version log
#[derive(Debug, Default)]
pub struct FieldDirectory {
    fields: RwLock<BTreeMap<String, FieldHandle>>,
}

impl FieldDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an existing field log
    pub fn get(&self, field: &str) -> Option<FieldHandle> {
        self.fields.read().get(field).cloned()
    }

    /// Look up a field log, creating an empty one on first use
    pub fn get_or_create(&self, field: &str) -> FieldHandle {
        if let Some(handle) = self.get(field) {
            return handle;
        }
        self.fields
            .write()
            .entry(field.to_string())
            .or_default()
            .clone()
    }

    /// All fields, sorted by name
    pub fn entries(&self) -> Vec<(String, FieldHandle)> {
        self.fields
            .read()
            .iter()
            .map(|(name, handle)| (name.clone(), handle.clone()))
            .collect()
    }

    /// Fields whose name starts with `prefix`, sorted by name
    pub fn entries_with_prefix(&self, prefix: &str) -> Vec<(String, FieldHandle)> {
        self.fields
            .read()
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, handle)| (name.clone(), handle.clone()))
            .collect()
    }

    /// Number of fields ever written
    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }
}

/// Every key the store has seen, with its fields
#[derive(Debug)]
pub struct RecordDirectory {
    records: DashMap<String, Arc<FieldDirectory>>,
}

impl RecordDirectory {
    /// Create an empty directory with default sharding
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Create an empty directory honouring `config.shard_amount`
    pub fn with_config(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let records = match config.shard_amount {
            Some(shards) => DashMap::with_shard_amount(shards),
            None => DashMap::new(),
        };
        Ok(Self { records })
    }

    /// Fields of an existing key
    pub fn record(&self, key: &str) -> Option<Arc<FieldDirectory>> {
        self.records.get(key).map(|entry| entry.value().clone())
    }

    /// Existing field log for `(key, field)`
    pub fn field_log(&self, key: &str, field: &str) -> Option<FieldHandle> {
        self.record(key)?.get(field)
    }

    /// Field log for `(key, field)`, registering the key and field if needed
    pub fn field_log_or_create(&self, key: &str, field: &str) -> FieldHandle {
        let record = match self.record(key) {
            Some(record) => record,
            None => self
                .records
                .entry(key.to_string())
                .or_default()
                .value()
                .clone(),
        };
        record.get_or_create(field)
    }

    /// All keys, sorted ascending
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.records.iter().map(|e| e.key().clone()).collect();
        keys.sort_unstable();
        keys
    }

    /// Snapshot of every record, in no particular order
    pub fn records(&self) -> Vec<(String, Arc<FieldDirectory>)> {
        self.records
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for RecordDirectory {
    fn default() -> Self {
        Self::new()
    }
}

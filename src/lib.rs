//! Temporal-Store: in-memory multi-version key/field store
//!
//! Answers both "what is the value now" and "what was the value at time T",
//! with per-field TTLs and atomic compare-and-swap.
//!
//! # Core Concepts
//!
//! - **Versions**: Immutable records of one write, ordered by effective timestamp
//! - **Field logs**: The complete, never-pruned history of one (key, field) pair
//! - **Tombstones**: Deletes are versions too, so time travel still sees the past
//! - **TTL**: Expiry is checked at read time against the query timestamp
//!
//! # Example
//!
//! ```
//! use temporal_store::prelude::*;
//!
//! let store = TemporalStore::new();
//! store.set(Timestamp::new(100), "u", "name", "A");
//! store.set(Timestamp::new(200), "u", "name", "B");
//!
//! let then = store.get_at(Timestamp::new(300), "u", "name", Timestamp::new(150));
//! assert_eq!(then.as_deref(), Some("A"));
//!
//! store.set_with_ttl(Timestamp::new(100), "s", "tok", "x", Ttl::new(50));
//! assert_eq!(store.get(Timestamp::new(150), "s", "tok"), None);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod query;
pub mod storage;

/// Main store type
pub mod db;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::StoreConfig;
    pub use crate::core::*;
    pub use crate::db::{StoreStats, TemporalStore};
    pub use crate::error::{Error, Result};
}

//! In-memory storage layer: the record directory and per-field logs

pub mod directory;

pub use directory::*;

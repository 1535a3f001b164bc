//! Core data types: logical time, versions, field logs and visibility

pub mod temporal;
pub mod timeline;
pub mod version;
pub mod visibility;

pub use temporal::*;
pub use timeline::*;
pub use version::*;
pub use visibility::{resolve, visible, Visibility};

//! Command language: parsing and execution of store commands

pub mod executor;
pub mod parser;

pub use executor::*;
pub use parser::*;

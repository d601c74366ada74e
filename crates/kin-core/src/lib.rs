//! Core types and trait definitions for the Kin relation-graph engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing heavier than
//! chrono and serde.

pub mod error;
pub mod ledger;
pub mod memory;
pub mod normalize;
pub mod person;
pub mod query;
pub mod relation;
pub mod source;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;

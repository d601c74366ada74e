//! SQLite backend for the Kin relation ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Because every operation is a
//! single serialized connection call, the duplicate checks in upsert and
//! edge insertion are atomic with respect to their writes.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteLedger;

//! Error types for `kin-core`.
//!
//! Ledger operations are pure data-structure work; the only failures this
//! crate itself can produce are contract violations (an encoded value that
//! no code path should ever have written).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown relation kind: {0:?}")]
  UnknownRelationKind(String),

  #[error("unknown gender: {0:?}")]
  UnknownGender(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

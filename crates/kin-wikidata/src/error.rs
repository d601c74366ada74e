//! Error types for `kin-wikidata`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("HTTP request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{endpoint} returned status {status}")]
  Status {
    endpoint: &'static str,
    status:   reqwest::StatusCode,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

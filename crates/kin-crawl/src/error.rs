//! Error types for `kin-crawl`.
//!
//! Source and ledger errors are boxed so the pipeline types stay
//! non-generic in their error positions.

use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single-entity ingestion. The crawler treats every variant
/// as recoverable: the entity is skipped and counted, never fatal.
#[derive(Debug, Error)]
pub enum IngestError {
  /// The upstream source has no record for the entity.
  #[error("entity not found upstream: {0}")]
  NotFound(String),

  /// The biographical detail fetch failed outright.
  #[error("detail fetch failed for {id}: {source}")]
  Fetch {
    id:     String,
    #[source]
    source: BoxedError,
  },

  /// The ledger refused a write — storage trouble, not bad upstream data.
  #[error("ledger error: {0}")]
  Ledger(#[source] BoxedError),
}

/// Failure to start a crawl run.
#[derive(Debug, Error)]
pub enum CrawlError {
  #[error("search returned no match for {0:?}")]
  NoMatch(String),

  #[error("seed search failed: {0}")]
  Search(#[source] BoxedError),
}

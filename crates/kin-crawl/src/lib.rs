//! Ingestion pipeline and recursive crawler for the Kin relation graph.
//!
//! Generic over the [`kin_core::source::RelationSource`] collaborator and
//! the [`kin_core::ledger::Ledger`] backend; all network unreliability is
//! contained here and converted into per-item skips plus counters.

pub mod crawler;
pub mod error;
pub mod ingest;

pub use crawler::{CrawlConfig, CrawlSummary, Crawler};
pub use error::{CrawlError, IngestError};
pub use ingest::{IngestReport, Ingestor};

//! Recursive crawler — breadth-first expansion of the ingestion pipeline
//! outward from a seed entity.

use std::{
  collections::{HashSet, VecDeque},
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use serde::{Deserialize, Serialize};

use kin_core::{ledger::Ledger, source::RelationSource};

use crate::{
  error::CrawlError,
  ingest::{IngestReport, Ingestor},
};

/// Tuning for a crawl run.
#[derive(Debug, Clone, Copy)]
pub struct CrawlConfig {
  /// Maximum expansion depth; entities discovered at this depth are still
  /// ingested, but their relations are not followed further.
  pub max_depth: u32,
  /// Mandatory delay after every external fetch.
  pub delay:     Duration,
}

impl Default for CrawlConfig {
  fn default() -> Self {
    Self { max_depth: 2, delay: Duration::from_secs(1) }
  }
}

/// Per-run counters, returned as the crawl summary.
#[derive(
  Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
  pub people_processed: u64,
  pub people_added:     u64,
  pub people_updated:   u64,
  pub edges_added:      u64,
  pub fetch_calls:      u64,
  pub errors:           u64,
}

impl CrawlSummary {
  fn absorb(&mut self, report: &IngestReport) {
    self.people_added += report.people_added;
    self.people_updated += report.people_updated;
    self.edges_added += report.edges_added;
    self.fetch_calls += report.fetch_calls;
    self.errors += report.errors;
  }

  /// A failed ingest still spent its one detail fetch.
  fn record_failure(&mut self) {
    self.errors += 1;
    self.fetch_calls += 1;
  }
}

/// Breadth-first crawler over a [`RelationSource`], writing into a
/// [`Ledger`].
///
/// A run is strictly sequential: one fetch at a time, paced by the
/// configured delay. Concurrency lives outside — e.g. one crawl task in the
/// background while interactive lookups hit the same ledger.
pub struct Crawler<'a, S, L> {
  source:   &'a S,
  ingestor: Ingestor<'a, S, L>,
  config:   CrawlConfig,
  stop:     Arc<AtomicBool>,
}

impl<'a, S, L> Crawler<'a, S, L>
where
  S: RelationSource,
  L: Ledger,
{
  pub fn new(source: &'a S, ledger: &'a L, config: CrawlConfig) -> Self {
    Self {
      source,
      ingestor: Ingestor::new(source, ledger, config.delay),
      config,
      stop: Arc::new(AtomicBool::new(false)),
    }
  }

  /// Share a caller-owned cancellation flag instead of the internal one.
  /// Lets a supervisor hold the flag before the crawl task is spawned.
  pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
    self.stop = stop;
    self
  }

  /// Handle for requesting cancellation from another task. The flag is
  /// checked between dequeue iterations, so a stop never interrupts an
  /// in-flight ingest and the ledger stays consistent.
  pub fn stop_flag(&self) -> Arc<AtomicBool> {
    Arc::clone(&self.stop)
  }

  /// Crawl outward from `seed` until the queue drains, the depth bound is
  /// exhausted, or a stop is requested.
  ///
  /// One entity's failure is logged and counted; it never aborts the run.
  pub async fn run(&self, seed: &str) -> CrawlSummary {
    let mut summary = CrawlSummary::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, u32)> =
      VecDeque::from([(seed.to_string(), 0)]);

    while let Some((id, depth)) = queue.pop_front() {
      if self.stop.load(Ordering::Relaxed) {
        tracing::info!(queued = queue.len() + 1, "stop requested; abandoning crawl");
        break;
      }
      if !visited.insert(id.clone()) {
        continue;
      }

      tracing::info!(%id, depth, max_depth = self.config.max_depth, "processing entity");
      match self.ingestor.ingest(&id).await {
        Ok(report) => {
          summary.people_processed += 1;
          summary.absorb(&report);
          if depth < self.config.max_depth {
            for other in report.discovered {
              if !visited.contains(&other) {
                queue.push_back((other, depth + 1));
              }
            }
          }
        }
        Err(e) => {
          tracing::warn!(%id, error = %e, "skipping entity");
          summary.record_failure();
        }
      }
    }

    tracing::info!(?summary, "crawl finished");
    summary
  }

  /// Resolve `query` to its first search hit and crawl from there.
  pub async fn run_from_search(
    &self,
    query: &str,
  ) -> Result<CrawlSummary, CrawlError> {
    let page = self
      .source
      .search(query, 1)
      .await
      .map_err(|e| CrawlError::Search(Box::new(e)))?;

    let Some(hit) = page.results.first() else {
      return Err(CrawlError::NoMatch(query.to_string()));
    };

    tracing::info!(id = %hit.id, label = %hit.label, "resolved search seed");
    Ok(self.run(&hit.id).await)
  }
}

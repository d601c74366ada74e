//! Shared handler state: the ledger, the relation source, and the
//! single-slot background-crawl supervisor.

use std::{
  sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use serde::{Deserialize, Serialize};

use kin_crawl::{CrawlConfig, CrawlError, CrawlSummary};

/// Everything the handlers need. Cheap to clone.
pub struct AppState<S, L> {
  pub source: Arc<S>,
  pub ledger: Arc<L>,
  pub crawls: Arc<CrawlManager>,
  /// Pacing for the one-shot ingest behind `GET /people/{id}` misses.
  pub ingest_pace: Duration,
  /// Defaults for crawls started without explicit tuning.
  pub crawl_config: CrawlConfig,
}

impl<S, L> AppState<S, L> {
  pub fn new(source: Arc<S>, ledger: Arc<L>) -> Self {
    Self {
      source,
      ledger,
      crawls: Arc::new(CrawlManager::default()),
      ingest_pace: Duration::ZERO,
      crawl_config: CrawlConfig::default(),
    }
  }
}

// Manual impl: `S` and `L` sit behind `Arc` and need not be `Clone`.
impl<S, L> Clone for AppState<S, L> {
  fn clone(&self) -> Self {
    Self {
      source:       Arc::clone(&self.source),
      ledger:       Arc::clone(&self.ledger),
      crawls:       Arc::clone(&self.crawls),
      ingest_pace:  self.ingest_pace,
      crawl_config: self.crawl_config,
    }
  }
}

/// Snapshot of the crawl slot, as served by `GET /crawls/current`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStatus {
  pub running: bool,
  pub seed:    Option<String>,
  pub summary: Option<CrawlSummary>,
  pub error:   Option<String>,
}

#[derive(Default)]
struct Slot {
  running: bool,
  seed:    Option<String>,
  stop:    Option<Arc<AtomicBool>>,
  summary: Option<CrawlSummary>,
  error:   Option<String>,
}

/// Bookkeeping for the single background crawl slot.
///
/// Deliberately minimal: one crawl at a time, the latest summary kept, no
/// history. Starting while one is running is a conflict, not a queue.
#[derive(Default)]
pub struct CrawlManager {
  inner: Mutex<Slot>,
}

impl CrawlManager {
  fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Claim the slot for a new run. Returns `false` when a crawl is already
  /// running; the claim and the check are one critical section.
  pub fn try_begin(&self, seed: String, stop: Arc<AtomicBool>) -> bool {
    let mut slot = self.lock();
    if slot.running {
      return false;
    }
    *slot = Slot {
      running: true,
      seed: Some(seed),
      stop: Some(stop),
      summary: None,
      error: None,
    };
    true
  }

  /// Release the slot, recording the run's outcome.
  pub fn finish(&self, result: Result<CrawlSummary, CrawlError>) {
    let mut slot = self.lock();
    slot.running = false;
    slot.stop = None;
    match result {
      Ok(summary) => slot.summary = Some(summary),
      Err(e) => slot.error = Some(e.to_string()),
    }
  }

  /// Set the stop flag of the running crawl. `false` when nothing runs.
  pub fn request_stop(&self) -> bool {
    let slot = self.lock();
    if let (true, Some(stop)) = (slot.running, &slot.stop) {
      stop.store(true, Ordering::Relaxed);
      true
    } else {
      false
    }
  }

  pub fn status(&self) -> CrawlStatus {
    let slot = self.lock();
    CrawlStatus {
      running: slot.running,
      seed:    slot.seed.clone(),
      summary: slot.summary,
      error:   slot.error.clone(),
    }
  }
}

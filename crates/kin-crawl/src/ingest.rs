//! Ingestion pipeline — fetch → normalize → ledger merge for one entity
//! and its immediate relations.
//!
//! This is the unit of work shared by interactive lookups and the
//! recursive crawler. It is idempotent: ingesting the same id twice leaves
//! the ledger in the same state as ingesting it once.

use std::time::Duration;

use kin_core::{
  ledger::{Ledger, Upsert},
  normalize::{RawPersonRecord, normalize},
  relation::RelationKind,
  source::{RelationRecords, RelationSource},
};

use crate::error::IngestError;

/// Counters and discoveries from one [`Ingestor::ingest`] call.
#[derive(Debug, Default, Clone)]
pub struct IngestReport {
  /// Relation ids encountered, in listing order. Candidates for further
  /// crawling; may contain ids the caller has already visited.
  pub discovered:     Vec<String>,
  pub people_added:   u64,
  pub people_updated: u64,
  pub edges_added:    u64,
  pub fetch_calls:    u64,
  /// Per-item skips: a failed relations fetch or a relation record with no
  /// usable id.
  pub errors:         u64,
}

/// Fetches one entity from the source and merges it, with its relation
/// edges, into the ledger.
pub struct Ingestor<'a, S, L> {
  source: &'a S,
  ledger: &'a L,
  pace:   Duration,
}

impl<'a, S, L> Ingestor<'a, S, L>
where
  S: RelationSource,
  L: Ledger,
{
  /// `pace` is slept after every external fetch; the upstream source is
  /// rate-limited and a crawl that skips the delay risks being blocked
  /// outright.
  pub fn new(source: &'a S, ledger: &'a L, pace: Duration) -> Self {
    Self { source, ledger, pace }
  }

  async fn pause(&self) {
    if !self.pace.is_zero() {
      tokio::time::sleep(self.pace).await;
    }
  }

  /// Ingest one entity: upsert its biographical record, then absorb its
  /// categorized relations as typed edges plus stub people.
  ///
  /// A relations-fetch failure degrades to an empty relation set — it never
  /// discards the already-upserted person. Only a missing or failed detail
  /// fetch makes the whole call fail, and that failure is recoverable for
  /// the caller.
  pub async fn ingest(&self, id: &str) -> Result<IngestReport, IngestError> {
    let mut report = IngestReport::default();

    report.fetch_calls += 1;
    let details = self.source.details(id).await;
    // The pacing delay holds after every fetch, failed ones included;
    // propagating first would let the next call fire immediately.
    self.pause().await;
    let details = details.map_err(|e| IngestError::Fetch {
      id:     id.to_string(),
      source: Box::new(e),
    })?;

    let Some(raw) = details else {
      return Err(IngestError::NotFound(id.to_string()));
    };

    match self
      .ledger
      .upsert_person(normalize(raw))
      .await
      .map_err(|e| IngestError::Ledger(Box::new(e)))?
    {
      Upsert::Created => report.people_added += 1,
      Upsert::Updated => report.people_updated += 1,
    }

    report.fetch_calls += 1;
    let relations = match self.source.relations(id).await {
      Ok(r) => r,
      Err(e) => {
        tracing::warn!(%id, error = %e, "relations fetch failed; continuing with none");
        report.errors += 1;
        RelationRecords::default()
      }
    };
    self.pause().await;

    let RelationRecords { parents, children, spouses, siblings } = relations;

    // Directionality table: parent edges always point parent → child;
    // spouse/sibling edges are recorded from this entity outward.
    for raw in parents {
      let other = raw.id.clone();
      self
        .absorb(&mut report, raw, &other, id, RelationKind::Parent)
        .await?;
    }
    for raw in children {
      let other = raw.id.clone();
      self
        .absorb(&mut report, raw, id, &other, RelationKind::Parent)
        .await?;
    }
    for raw in spouses {
      let other = raw.id.clone();
      self
        .absorb(&mut report, raw, id, &other, RelationKind::Spouse)
        .await?;
    }
    for raw in siblings {
      let other = raw.id.clone();
      self
        .absorb(&mut report, raw, id, &other, RelationKind::Sibling)
        .await?;
    }

    Ok(report)
  }

  /// Upsert one relation record as a (possibly stub) person and wire the
  /// edge. A record without an id is a data-shape failure: dropped and
  /// counted, processing continues.
  async fn absorb(
    &self,
    report: &mut IngestReport,
    raw: RawPersonRecord,
    source: &str,
    target: &str,
    kind: RelationKind,
  ) -> Result<(), IngestError> {
    if raw.id.is_empty() {
      tracing::warn!(?kind, "relation record without id dropped");
      report.errors += 1;
      return Ok(());
    }

    let other = raw.id.clone();
    match self
      .ledger
      .upsert_person(normalize(raw))
      .await
      .map_err(|e| IngestError::Ledger(Box::new(e)))?
    {
      Upsert::Created => report.people_added += 1,
      Upsert::Updated => report.people_updated += 1,
    }

    if self
      .ledger
      .add_edge(source, target, kind)
      .await
      .map_err(|e| IngestError::Ledger(Box::new(e)))?
    {
      report.edges_added += 1;
    }

    report.discovered.push(other);
    Ok(())
  }
}

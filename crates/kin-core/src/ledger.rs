//! The `Ledger` trait — the relation-graph abstraction.
//!
//! Implemented by [`crate::memory::MemoryLedger`] and by the SQLite backend
//! in `kin-store-sqlite`. Higher layers (the ingestion pipeline, the
//! crawler, the API) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use crate::{
  person::Person,
  relation::{Edge, RelationKind, Relations},
};

/// Outcome of an upsert, distinguishing first sight from a merge.
/// The crawler's `people_added` / `people_updated` counters hang off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
  Created,
  Updated,
}

/// Abstraction over a relation-graph backend.
///
/// Implementations must make the duplicate checks in [`Ledger::upsert_person`]
/// and [`Ledger::add_edge`] atomic with respect to the write, so two
/// ingestion pipelines running concurrently against the same store cannot
/// race a check-then-act.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait Ledger: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Merge `person` into the store. An existing record with the same id is
  /// updated field-by-field (overwrite-if-present); otherwise the person is
  /// inserted as-is. `last_updated` is stamped either way.
  fn upsert_person(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<Upsert, Self::Error>> + Send + '_;

  /// Record the edge `(source, target, kind)` at most once.
  ///
  /// Returns `false` when the edge already exists — for spouse/sibling the
  /// check covers both orientations, so the reverse insert of a symmetric
  /// relation is a no-op. Endpoints unknown to the ledger are auto-created
  /// as stub people; an edge is never dropped for a missing endpoint.
  fn add_edge<'a>(
    &'a self,
    source: &'a str,
    target: &'a str,
    kind: RelationKind,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Categorized relations for `id`, derived by scanning edges: `parents`
  /// are sources of parent edges targeting `id`, `children` are targets of
  /// parent edges sourced at `id`, and spouses/siblings are the opposite
  /// endpoints of the symmetric kinds regardless of stored direction.
  fn relations_for<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Relations, Self::Error>> + Send + 'a;

  /// Every edge with `id` as either endpoint, in insertion order. This
  /// ordering is what makes the breadth-first neighborhood query
  /// deterministic.
  fn edges_touching<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Vec<Edge>, Self::Error>> + Send + 'a;
}

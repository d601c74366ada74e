//! In-memory [`Ledger`] implementation.
//!
//! The reference implementation of the graph invariants, and the backend of
//! choice for tests. Constructed explicitly and passed by reference — never
//! a module-level singleton.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;

use crate::{
  ledger::{Ledger, Upsert},
  person::Person,
  relation::{Edge, RelationKind, Relations},
};

#[derive(Default)]
struct Inner {
  people: HashMap<String, Person>,
  /// Insertion order is load-bearing: it drives deterministic traversal.
  edges:  Vec<Edge>,
}

/// A ledger held entirely in memory behind a mutex.
///
/// The mutex makes every operation's check-then-act atomic. Lock scopes are
/// short and never cross an await point.
#[derive(Default)]
pub struct MemoryLedger {
  inner: Mutex<Inner>,
}

impl MemoryLedger {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl Ledger for MemoryLedger {
  type Error = Infallible;

  async fn upsert_person(&self, mut person: Person) -> Result<Upsert, Infallible> {
    person.last_updated = Utc::now();
    let mut inner = self.lock();
    match inner.people.get_mut(&person.id) {
      Some(existing) => {
        existing.merge_from(person);
        Ok(Upsert::Updated)
      }
      None => {
        inner.people.insert(person.id.clone(), person);
        Ok(Upsert::Created)
      }
    }
  }

  async fn add_edge(
    &self,
    source: &str,
    target: &str,
    kind: RelationKind,
  ) -> Result<bool, Infallible> {
    let mut inner = self.lock();
    if inner.edges.iter().any(|e| e.matches(source, target, kind)) {
      return Ok(false);
    }
    for id in [source, target] {
      inner
        .people
        .entry(id.to_string())
        .or_insert_with(|| Person::stub(id));
    }
    inner.edges.push(Edge {
      source_id: source.to_string(),
      target_id: target.to_string(),
      kind,
    });
    Ok(true)
  }

  async fn get_person(&self, id: &str) -> Result<Option<Person>, Infallible> {
    Ok(self.lock().people.get(id).cloned())
  }

  async fn relations_for(&self, id: &str) -> Result<Relations, Infallible> {
    let inner = self.lock();
    let mut relations = Relations::default();

    for edge in &inner.edges {
      match edge.kind {
        RelationKind::Parent => {
          if edge.target_id == id {
            if let Some(p) = inner.people.get(&edge.source_id) {
              relations.parents.push(p.clone());
            }
          }
          if edge.source_id == id {
            if let Some(p) = inner.people.get(&edge.target_id) {
              relations.children.push(p.clone());
            }
          }
        }
        RelationKind::Spouse | RelationKind::Sibling => {
          if let Some(other) = edge.other_endpoint(id) {
            if let Some(p) = inner.people.get(other) {
              let bucket = if edge.kind == RelationKind::Spouse {
                &mut relations.spouses
              } else {
                &mut relations.siblings
              };
              bucket.push(p.clone());
            }
          }
        }
      }
    }

    Ok(relations)
  }

  async fn edges_touching(&self, id: &str) -> Result<Vec<Edge>, Infallible> {
    Ok(
      self
        .lock()
        .edges
        .iter()
        .filter(|e| e.source_id == id || e.target_id == id)
        .cloned()
        .collect(),
    )
  }
}

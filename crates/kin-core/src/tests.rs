//! Ledger and neighborhood-query tests against [`MemoryLedger`].

use chrono::NaiveDate;

use crate::{
  ledger::{Ledger, Upsert},
  memory::MemoryLedger,
  normalize::{RawPersonRecord, normalize},
  person::{Person, UNKNOWN_NAME},
  query::neighborhood,
  relation::RelationKind,
};

fn person(id: &str, name: &str) -> Person {
  let mut p = Person::stub(id);
  p.name = name.to_string();
  p
}

// ─── Upsert / merge ──────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_creates_then_updates() {
  let ledger = MemoryLedger::new();

  assert_eq!(
    ledger.upsert_person(person("Q1", "Alice")).await.unwrap(),
    Upsert::Created,
  );

  let mut richer = person("Q1", "Alice Liddell");
  richer.birth_date = NaiveDate::from_ymd_opt(1852, 5, 4);
  assert_eq!(ledger.upsert_person(richer).await.unwrap(), Upsert::Updated);

  let stored = ledger.get_person("Q1").await.unwrap().unwrap();
  assert_eq!(stored.name, "Alice Liddell");
  assert_eq!(stored.birth_date, NaiveDate::from_ymd_opt(1852, 5, 4));
}

#[tokio::test]
async fn merge_overwrites_only_present_fields() {
  let ledger = MemoryLedger::new();

  let mut full = person("Q1", "Alice");
  full.bio = Some("a person".into());
  full.occupations = vec!["author".into()];
  ledger.upsert_person(full).await.unwrap();

  // A later stub-ish record must not erase what we already know.
  ledger.upsert_person(Person::stub("Q1")).await.unwrap();

  let stored = ledger.get_person("Q1").await.unwrap().unwrap();
  assert_eq!(stored.name, "Alice");
  assert_eq!(stored.bio.as_deref(), Some("a person"));
  assert_eq!(stored.occupations, ["author"]);
}

#[tokio::test]
async fn normalized_record_roundtrips_through_ledger() {
  let ledger = MemoryLedger::new();
  let incoming = normalize(RawPersonRecord {
    id:         "Q9682".into(),
    name:       Some("Elizabeth II".into()),
    birth_date: Some("+1926-04-21T00:00:00Z".into()),
    ..Default::default()
  });
  ledger.upsert_person(incoming).await.unwrap();

  let stored = ledger.get_person("Q9682").await.unwrap().unwrap();
  assert_eq!(stored.name, "Elizabeth II");
  assert_eq!(stored.birth_date, NaiveDate::from_ymd_opt(1926, 4, 21));
}

// ─── Edges ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_edge_is_a_noop() {
  let ledger = MemoryLedger::new();
  assert!(ledger.add_edge("Q2", "Q1", RelationKind::Parent).await.unwrap());
  assert!(!ledger.add_edge("Q2", "Q1", RelationKind::Parent).await.unwrap());

  assert_eq!(ledger.edges_touching("Q1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn reversed_symmetric_edge_is_a_noop() {
  let ledger = MemoryLedger::new();
  assert!(ledger.add_edge("Q1", "Q2", RelationKind::Spouse).await.unwrap());
  assert!(!ledger.add_edge("Q2", "Q1", RelationKind::Spouse).await.unwrap());

  // Parent edges stay directional: the reverse is a distinct edge.
  assert!(ledger.add_edge("Q1", "Q2", RelationKind::Parent).await.unwrap());
  assert!(ledger.add_edge("Q2", "Q1", RelationKind::Parent).await.unwrap());
}

#[tokio::test]
async fn edge_auto_creates_stub_endpoints() {
  let ledger = MemoryLedger::new();
  ledger.add_edge("Q2", "Q1", RelationKind::Parent).await.unwrap();

  let stub = ledger.get_person("Q2").await.unwrap().unwrap();
  assert_eq!(stub.name, UNKNOWN_NAME);
  assert!(ledger.get_person("Q1").await.unwrap().is_some());
}

#[tokio::test]
async fn parent_edge_is_asymmetric() {
  let ledger = MemoryLedger::new();
  ledger.upsert_person(person("Q1", "Child")).await.unwrap();
  ledger.upsert_person(person("Q2", "Parent")).await.unwrap();
  ledger.add_edge("Q2", "Q1", RelationKind::Parent).await.unwrap();

  let child_side = ledger.relations_for("Q1").await.unwrap();
  assert_eq!(child_side.parents.len(), 1);
  assert_eq!(child_side.parents[0].id, "Q2");
  assert!(child_side.children.is_empty());

  let parent_side = ledger.relations_for("Q2").await.unwrap();
  assert_eq!(parent_side.children.len(), 1);
  assert_eq!(parent_side.children[0].id, "Q1");
  assert!(parent_side.parents.is_empty());
}

#[tokio::test]
async fn spouse_and_sibling_are_symmetric_in_queries() {
  let ledger = MemoryLedger::new();
  ledger.add_edge("Q1", "Q2", RelationKind::Spouse).await.unwrap();
  ledger.add_edge("Q3", "Q1", RelationKind::Sibling).await.unwrap();

  let q1 = ledger.relations_for("Q1").await.unwrap();
  assert_eq!(q1.spouses[0].id, "Q2");
  assert_eq!(q1.siblings[0].id, "Q3");

  let q2 = ledger.relations_for("Q2").await.unwrap();
  assert_eq!(q2.spouses[0].id, "Q1");

  let q3 = ledger.relations_for("Q3").await.unwrap();
  assert_eq!(q3.siblings[0].id, "Q1");
}

// ─── Neighborhood ────────────────────────────────────────────────────────────

#[tokio::test]
async fn neighborhood_of_lone_seed() {
  let ledger = MemoryLedger::new();
  ledger.upsert_person(person("Q1", "A")).await.unwrap();

  let graph = neighborhood(&ledger, "Q1", 2).await.unwrap().unwrap();
  assert_eq!(graph.nodes.len(), 1);
  assert_eq!(graph.nodes[0].person.id, "Q1");
  assert_eq!(graph.nodes[0].depth, 0);
  assert!(graph.links.is_empty());
}

#[tokio::test]
async fn neighborhood_of_unknown_focal_is_none() {
  let ledger = MemoryLedger::new();
  assert!(neighborhood(&ledger, "Q404", 2).await.unwrap().is_none());
}

#[tokio::test]
async fn neighborhood_respects_depth_bound() {
  let ledger = MemoryLedger::new();
  // Q4 -parent-> Q3 -parent-> Q2 -parent-> Q1
  ledger.add_edge("Q2", "Q1", RelationKind::Parent).await.unwrap();
  ledger.add_edge("Q3", "Q2", RelationKind::Parent).await.unwrap();
  ledger.add_edge("Q4", "Q3", RelationKind::Parent).await.unwrap();

  let graph = neighborhood(&ledger, "Q1", 2).await.unwrap().unwrap();
  let ids: Vec<&str> = graph.nodes.iter().map(|n| n.person.id.as_str()).collect();
  assert_eq!(ids, ["Q1", "Q2", "Q3"]);
  assert_eq!(graph.nodes[2].depth, 2);

  // Q3 sits at the bound: included, but its edge to Q4 is not expanded.
  assert_eq!(graph.links.len(), 2);
}

#[tokio::test]
async fn neighborhood_emits_each_link_once_in_stored_direction() {
  let ledger = MemoryLedger::new();
  ledger.add_edge("Q1", "Q2", RelationKind::Spouse).await.unwrap();

  // Both endpoints get expanded; the single stored edge must appear once.
  let graph = neighborhood(&ledger, "Q2", 3).await.unwrap().unwrap();
  assert_eq!(graph.links.len(), 1);
  assert_eq!(graph.links[0].source_id, "Q1");
  assert_eq!(graph.links[0].target_id, "Q2");
}

#[tokio::test]
async fn neighborhood_is_deterministic() {
  let ledger = MemoryLedger::new();
  ledger.add_edge("Q2", "Q1", RelationKind::Parent).await.unwrap();
  ledger.add_edge("Q3", "Q1", RelationKind::Parent).await.unwrap();
  ledger.add_edge("Q1", "Q4", RelationKind::Spouse).await.unwrap();
  ledger.add_edge("Q2", "Q3", RelationKind::Spouse).await.unwrap();

  let a = neighborhood(&ledger, "Q1", 2).await.unwrap().unwrap();
  let b = neighborhood(&ledger, "Q1", 2).await.unwrap().unwrap();

  let order = |g: &crate::query::Neighborhood| {
    g.nodes
      .iter()
      .map(|n| (n.person.id.clone(), n.depth))
      .collect::<Vec<_>>()
  };
  assert_eq!(order(&a), order(&b));
  assert_eq!(a.links, b.links);
}

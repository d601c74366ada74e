//! Neighborhood query — the bounded-depth induced subgraph around a focal
//! person, shaped for graph visualization.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::{ledger::Ledger, person::Person, relation::Edge};

/// A person snapshot tagged with the depth at which the traversal found it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodNode {
  #[serde(flatten)]
  pub person: Person,
  pub depth:  u32,
}

/// The induced subgraph around a focal person. `links` preserve the
/// ledger's stored edge direction (parent edges are never inverted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighborhood {
  pub nodes: Vec<NeighborhoodNode>,
  pub links: Vec<Edge>,
}

/// Breadth-first traversal from `focal_id`, bounded by `max_depth`.
///
/// A node joins the visited set the moment it is discovered, so a shorter
/// path always wins and no node is expanded twice; its depth is fixed at
/// enqueue time. Nodes at `max_depth` are included in `nodes` but their own
/// edges are not expanded. Every edge traversed while expanding a node is
/// appended to `links` exactly once. Traversal follows the ledger's edge
/// insertion order, so the result is deterministic for a given ledger
/// state.
///
/// Returns `None` when `focal_id` is not in the ledger — an unknown focal
/// person is an explicit not-found, not an empty graph.
pub async fn neighborhood<L: Ledger>(
  ledger:    &L,
  focal_id:  &str,
  max_depth: u32,
) -> Result<Option<Neighborhood>, L::Error> {
  let Some(focal) = ledger.get_person(focal_id).await? else {
    return Ok(None);
  };

  let mut nodes = vec![NeighborhoodNode { person: focal, depth: 0 }];
  let mut links: Vec<Edge> = Vec::new();
  let mut seen_links: HashSet<Edge> = HashSet::new();
  let mut visited: HashSet<String> =
    HashSet::from([focal_id.to_string()]);
  let mut queue: VecDeque<(String, u32)> =
    VecDeque::from([(focal_id.to_string(), 0)]);

  while let Some((id, depth)) = queue.pop_front() {
    if depth == max_depth {
      continue;
    }
    for edge in ledger.edges_touching(&id).await? {
      let Some(other) = edge.other_endpoint(&id) else {
        continue;
      };
      let other = other.to_string();
      if seen_links.insert(edge.clone()) {
        links.push(edge);
      }
      if visited.insert(other.clone()) {
        // add_edge stubs both endpoints, so the lookup only misses if the
        // backend skipped stub creation; the node is then simply omitted.
        if let Some(person) = ledger.get_person(&other).await? {
          nodes.push(NeighborhoodNode { person, depth: depth + 1 });
          queue.push_back((other, depth + 1));
        }
      }
    }
  }

  Ok(Some(Neighborhood { nodes, links }))
}

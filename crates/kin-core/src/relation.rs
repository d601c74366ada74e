//! Typed relation edges between people.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, person::Person};

/// The three persisted relation kinds.
///
/// `child` is not a stored kind — it is the inverse view of a `parent` edge
/// and is synthesized at query time.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
  /// Directed: source is the parent, target is the child. Never symmetrized.
  Parent,
  Spouse,
  Sibling,
}

impl RelationKind {
  /// Whether `(a, b)` and `(b, a)` name the same logical relation.
  pub fn is_symmetric(self) -> bool {
    matches!(self, Self::Spouse | Self::Sibling)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Parent => "parent",
      Self::Spouse => "spouse",
      Self::Sibling => "sibling",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "parent" => Ok(Self::Parent),
      "spouse" => Ok(Self::Spouse),
      "sibling" => Ok(Self::Sibling),
      other => Err(Error::UnknownRelationKind(other.to_string())),
    }
  }
}

/// A directed, typed edge between two ledger ids.
///
/// Spouse and sibling edges are stored once, in arrival direction, and
/// treated as unordered by every query; the stored direction is still what
/// appears in query output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
  #[serde(rename = "source")]
  pub source_id: String,
  #[serde(rename = "target")]
  pub target_id: String,
  pub kind:      RelationKind,
}

impl Edge {
  /// The endpoint opposite `id`, if `id` is one of the endpoints.
  pub fn other_endpoint(&self, id: &str) -> Option<&str> {
    if self.source_id == id {
      Some(&self.target_id)
    } else if self.target_id == id {
      Some(&self.source_id)
    } else {
      None
    }
  }

  /// True when this edge records the same logical relation as
  /// `(source, target, kind)`, honouring symmetry for spouse/sibling.
  pub fn matches(&self, source: &str, target: &str, kind: RelationKind) -> bool {
    if self.kind != kind {
      return false;
    }
    (self.source_id == source && self.target_id == target)
      || (kind.is_symmetric()
        && self.source_id == target
        && self.target_id == source)
  }
}

/// The four categorized relation lists for one person.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relations {
  pub parents:  Vec<Person>,
  pub children: Vec<Person>,
  pub spouses:  Vec<Person>,
  pub siblings: Vec<Person>,
}

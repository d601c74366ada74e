//! The knowledge-base collaborator interface consumed by the ingestion
//! pipeline and the crawler.
//!
//! The remote source is network-bound, rate-limited, and may return partial
//! or malformed data; these types are its honest shape. Implementations own
//! their own request timeouts — no call may block indefinitely.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::normalize::RawPersonRecord;

/// One search hit from the upstream source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
  pub id:          String,
  pub label:       String,
  #[serde(default)]
  pub description: String,
}

/// A page of search results.
///
/// `total` and `pages` are best-effort estimates derived from the upstream
/// continuation token — display hints, not exact counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
  pub results:   Vec<SearchHit>,
  pub total:     usize,
  pub page:      usize,
  #[serde(rename = "pageSize")]
  pub page_size: usize,
  pub pages:     usize,
}

/// Raw relation records for one person, categorized by the upstream source.
/// Entries carry at minimum an id and usually a name; dates are still
/// unparsed strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationRecords {
  pub parents:  Vec<RawPersonRecord>,
  pub children: Vec<RawPersonRecord>,
  pub spouses:  Vec<RawPersonRecord>,
  pub siblings: Vec<RawPersonRecord>,
}

impl RelationRecords {
  /// Record count across all four categories.
  pub fn len(&self) -> usize {
    self.parents.len()
      + self.children.len()
      + self.spouses.len()
      + self.siblings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// A remote knowledge base that can resolve people and their family
/// relations.
pub trait RelationSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Free-text people search. Expected to fail soft — an empty page, not an
  /// error — on transient upstream trouble.
  fn search<'a>(
    &'a self,
    query: &'a str,
    page: usize,
  ) -> impl Future<Output = Result<SearchPage, Self::Error>> + Send + 'a;

  /// Full biographical record for `id`, or `None` when the source does not
  /// know the entity.
  fn details<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<RawPersonRecord>, Self::Error>> + Send + 'a;

  /// Categorized family relations for `id`.
  fn relations<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<RelationRecords, Self::Error>> + Send + 'a;
}

//! Entity normalizer — shapes raw upstream records into canonical
//! [`Person`]s.
//!
//! Upstream records arrive with every field optional, dates still as
//! strings in whichever format the source chose, and gender as a free-text
//! token. Normalization defaults everything explicitly; a malformed field
//! is dropped, never an error, so one bad value can never abort ingestion
//! of the rest of the record.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::person::{Gender, Person, UNKNOWN_NAME};

/// A biographical record as it arrives from the knowledge-base client or
/// from a relation listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPersonRecord {
  pub id:          String,
  #[serde(default)]
  pub name:        Option<String>,
  #[serde(default)]
  pub birth_date:  Option<String>,
  #[serde(default)]
  pub death_date:  Option<String>,
  #[serde(default)]
  pub bio:         Option<String>,
  #[serde(default)]
  pub gender:      Option<String>,
  #[serde(default)]
  pub image_url:   Option<String>,
  #[serde(default)]
  pub birth_place: Option<String>,
  #[serde(default)]
  pub occupations: Vec<String>,
}

impl RawPersonRecord {
  /// A record carrying nothing but an id, as relation listings often do.
  pub fn bare(id: impl Into<String>) -> Self {
    Self { id: id.into(), ..Self::default() }
  }
}

/// Convert a raw record into a canonical [`Person`].
pub fn normalize(raw: RawPersonRecord) -> Person {
  Person {
    id:           raw.id,
    name:         raw
      .name
      .filter(|n| !n.is_empty())
      .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
    birth_date:   raw.birth_date.as_deref().and_then(parse_date),
    death_date:   raw.death_date.as_deref().and_then(parse_date),
    bio:          raw.bio.filter(|b| !b.is_empty()),
    gender:       raw.gender.as_deref().map_or(Gender::Unknown, lookup_gender),
    image_url:    raw.image_url.filter(|u| !u.is_empty()),
    birth_place:  raw.birth_place.filter(|p| !p.is_empty()),
    occupations:  dedup_occupations(raw.occupations),
    last_updated: Utc::now(),
  }
}

/// Parse the calendar date out of any of the formats the source emits: a
/// full RFC 3339 timestamp, a bare `YYYY-MM-DD`, or the knowledge base's
/// signed-year timestamp (`+1936-10-15T00:00:00Z` — the leading sign is
/// stripped before parsing). Anything else is `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
  let s = s.strip_prefix('+').unwrap_or(s);
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.date_naive());
  }
  let bare = s.trim_end_matches('Z');
  if let Ok(dt) = NaiveDateTime::parse_from_str(bare, "%Y-%m-%dT%H:%M:%S") {
    return Some(dt.date());
  }
  NaiveDate::parse_from_str(bare, "%Y-%m-%d").ok()
}

/// Fixed gender lookup: unrecognized tokens map to `Other`, the empty
/// string to `Unknown`.
fn lookup_gender(s: &str) -> Gender {
  match s.to_ascii_lowercase().as_str() {
    "male" | "m" => Gender::Male,
    "female" | "f" => Gender::Female,
    "" => Gender::Unknown,
    _ => Gender::Other,
  }
}

/// Deduplicate by exact string match, preserving first-seen order.
fn dedup_occupations(raw: Vec<String>) -> Vec<String> {
  let mut seen = HashSet::new();
  raw
    .into_iter()
    .filter(|o| !o.is_empty() && seen.insert(o.clone()))
    .collect()
}

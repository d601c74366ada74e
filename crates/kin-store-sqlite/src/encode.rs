//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as `YYYY-MM-DD`, timestamps as RFC 3339
//! strings, occupations as a compact JSON array, and enums as their
//! lowercase discriminants.

use chrono::{DateTime, NaiveDate, Utc};
use kin_core::{
  person::{Gender, Person},
  relation::{Edge, RelationKind},
};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Gender ──────────────────────────────────────────────────────────────────

pub fn decode_gender(s: &str) -> Result<Gender> {
  match s {
    "male" => Ok(Gender::Male),
    "female" => Ok(Gender::Female),
    "other" => Ok(Gender::Other),
    "unknown" => Ok(Gender::Unknown),
    other => Err(kin_core::Error::UnknownGender(other.to_string()).into()),
  }
}

// ─── Occupations ─────────────────────────────────────────────────────────────

pub fn encode_occupations(occupations: &[String]) -> Result<String> {
  Ok(serde_json::to_string(occupations)?)
}

pub fn decode_occupations(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Error bridging ──────────────────────────────────────────────────────────

/// Carry a store error across the `tokio_rusqlite::Connection::call`
/// boundary, which only speaks `tokio_rusqlite::Error`.
pub fn boxed(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `people` row.
pub struct RawPersonRow {
  pub person_id:    String,
  pub name:         String,
  pub birth_date:   Option<String>,
  pub death_date:   Option<String>,
  pub bio:          Option<String>,
  pub gender:       String,
  pub image_url:    Option<String>,
  pub birth_place:  Option<String>,
  pub occupations:  String,
  pub last_updated: String,
}

impl RawPersonRow {
  /// Column list matching [`RawPersonRow::from_row`], with the `p.` alias
  /// used by every person-producing query.
  pub const COLUMNS: &'static str = "p.person_id, p.name, p.birth_date, \
     p.death_date, p.bio, p.gender, p.image_url, p.birth_place, \
     p.occupations, p.last_updated";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:    row.get(0)?,
      name:         row.get(1)?,
      birth_date:   row.get(2)?,
      death_date:   row.get(3)?,
      bio:          row.get(4)?,
      gender:       row.get(5)?,
      image_url:    row.get(6)?,
      birth_place:  row.get(7)?,
      occupations:  row.get(8)?,
      last_updated: row.get(9)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:           self.person_id,
      name:         self.name,
      birth_date:   self.birth_date.as_deref().map(decode_date).transpose()?,
      death_date:   self.death_date.as_deref().map(decode_date).transpose()?,
      bio:          self.bio,
      gender:       decode_gender(&self.gender)?,
      image_url:    self.image_url,
      birth_place:  self.birth_place,
      occupations:  decode_occupations(&self.occupations)?,
      last_updated: decode_dt(&self.last_updated)?,
    })
  }
}

/// Raw strings read directly from an `edges` row.
pub struct RawEdgeRow {
  pub source_id: String,
  pub target_id: String,
  pub kind:      String,
}

impl RawEdgeRow {
  pub fn into_edge(self) -> Result<Edge> {
    Ok(Edge {
      source_id: self.source_id,
      target_id: self.target_id,
      kind:      RelationKind::parse(&self.kind)?,
    })
  }
}

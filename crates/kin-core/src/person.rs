//! Person — the canonical biographical record held by the ledger.
//!
//! A person is created the first time its id is seen (search hit, detail
//! fetch, or as a relation stub in someone else's relation list) and never
//! deleted; later, more complete fetches only add or overwrite fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when the upstream source has no label for a person.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Gender as normalized by the entity normalizer.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
  /// Recognized by the source but outside the fixed lookup table.
  Other,
  #[default]
  Unknown,
}

impl Gender {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Male => "male",
      Self::Female => "female",
      Self::Other => "other",
      Self::Unknown => "unknown",
    }
  }
}

/// A person in the relation ledger.
///
/// `id` is the opaque stable identifier assigned by the external knowledge
/// base (e.g. `Q9682`); it is never generated locally. Optional fields are
/// explicit `None` rather than absent keys, so serialized snapshots always
/// carry the full shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub id:           String,
  pub name:         String,
  pub birth_date:   Option<NaiveDate>,
  pub death_date:   Option<NaiveDate>,
  pub bio:          Option<String>,
  pub gender:       Gender,
  pub image_url:    Option<String>,
  pub birth_place:  Option<String>,
  pub occupations:  Vec<String>,
  /// Stamped by the ledger on every merge. Staleness display only; carries
  /// no invariant weight.
  pub last_updated: DateTime<Utc>,
}

impl Person {
  /// A person known only by id — created to satisfy an edge endpoint before
  /// the full record has been fetched.
  pub fn stub(id: impl Into<String>) -> Self {
    Self {
      id:           id.into(),
      name:         UNKNOWN_NAME.to_string(),
      birth_date:   None,
      death_date:   None,
      bio:          None,
      gender:       Gender::Unknown,
      image_url:    None,
      birth_place:  None,
      occupations:  Vec::new(),
      last_updated: Utc::now(),
    }
  }

  /// Field-by-field overwrite-if-present merge of a later fetch into `self`.
  ///
  /// The `"Unknown"` name sentinel counts as absent here, so a relation stub
  /// never clobbers a real name. A non-empty occupation list replaces the
  /// stored one wholesale.
  pub fn merge_from(&mut self, incoming: Person) {
    if incoming.name != UNKNOWN_NAME {
      self.name = incoming.name;
    }
    if incoming.birth_date.is_some() {
      self.birth_date = incoming.birth_date;
    }
    if incoming.death_date.is_some() {
      self.death_date = incoming.death_date;
    }
    if incoming.bio.is_some() {
      self.bio = incoming.bio;
    }
    if incoming.gender != Gender::Unknown {
      self.gender = incoming.gender;
    }
    if incoming.image_url.is_some() {
      self.image_url = incoming.image_url;
    }
    if incoming.birth_place.is_some() {
      self.birth_place = incoming.birth_place;
    }
    if !incoming.occupations.is_empty() {
      self.occupations = incoming.occupations;
    }
    self.last_updated = incoming.last_updated;
  }
}

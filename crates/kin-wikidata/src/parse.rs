//! Pure decoders for Wikidata JSON payloads.
//!
//! Everything here takes an already-deserialized `serde_json::Value` and
//! never touches the network, so the full decoding surface is testable
//! against canned fixtures. Malformed pieces are dropped, not errors:
//! upstream data quality is uneven and one bad claim must not sink an
//! entity.

use std::collections::HashMap;

use serde_json::Value;

use kin_core::{
  normalize::RawPersonRecord,
  source::{SearchHit, SearchPage},
};

// Wikidata property ids.
const PROP_BIRTH_DATE: &str = "P569";
const PROP_DEATH_DATE: &str = "P570";
const PROP_GENDER: &str = "P21";
const PROP_IMAGE: &str = "P18";
const PROP_BIRTH_PLACE: &str = "P19";
const PROP_OCCUPATION: &str = "P106";

// Sex-or-gender item ids.
const ITEM_MALE: &str = "Q6581097";
const ITEM_FEMALE: &str = "Q6581072";

/// A decoded `wbgetentities` entity. `birth_place_id` and `occupation_ids`
/// are unresolved item ids; the client resolves them to labels with one
/// batched follow-up request.
#[derive(Debug, Default)]
pub struct ParsedEntity {
  pub record:         RawPersonRecord,
  pub birth_place_id: Option<String>,
  pub occupation_ids: Vec<String>,
}

/// Decode a `wbsearchentities` response into a page of hits.
///
/// The action API reports no total count, only a `search-continue` offset
/// when more results exist, so `total` and `pages` are estimates: the
/// continuation offset, plus one if this page came back full.
pub fn parse_search_page(
  data: &Value,
  page: usize,
  limit: usize,
) -> SearchPage {
  let offset = (page.max(1) - 1) * limit;

  let results: Vec<SearchHit> = data["search"]
    .as_array()
    .map(|items| {
      items
        .iter()
        .filter_map(|item| {
          Some(SearchHit {
            id:          item["id"].as_str()?.to_string(),
            label:       item["label"].as_str().unwrap_or("Unknown").to_string(),
            description: item["description"].as_str().unwrap_or("").to_string(),
          })
        })
        .collect()
    })
    .unwrap_or_default();

  let cont = data["search-continue"]
    .as_u64()
    .map(|c| c as usize)
    .unwrap_or(offset + results.len());
  let total = cont + usize::from(results.len() == limit);
  let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };

  SearchPage { results, total, page, page_size: limit, pages }
}

/// Decode one entity out of a `wbgetentities` response. `None` when the
/// response does not carry the requested entity.
pub fn parse_entity(data: &Value, id: &str) -> Option<ParsedEntity> {
  let entity = data.get("entities")?.get(id)?;
  let claims = &entity["claims"];

  let mut parsed = ParsedEntity {
    record: RawPersonRecord {
      id:         id.to_string(),
      name:       en_value(&entity["labels"]),
      bio:        en_value(&entity["descriptions"]),
      birth_date: claim_time(claims, PROP_BIRTH_DATE),
      death_date: claim_time(claims, PROP_DEATH_DATE),
      gender:     claim_item_id(claims, PROP_GENDER)
        .map(|qid| gender_token(&qid).to_string()),
      image_url:  claims[PROP_IMAGE][0]["mainsnak"]["datavalue"]["value"]
        .as_str()
        .map(commons_file_url),
      ..RawPersonRecord::default()
    },
    birth_place_id: claim_item_id(claims, PROP_BIRTH_PLACE),
    occupation_ids: Vec::new(),
  };

  if let Some(occupations) = claims[PROP_OCCUPATION].as_array() {
    parsed.occupation_ids = occupations
      .iter()
      .filter_map(|c| {
        c["mainsnak"]["datavalue"]["value"]["id"].as_str().map(String::from)
      })
      .collect();
  }

  Some(parsed)
}

/// Extract `{ item id → English label }` from a `wbgetentities` labels
/// response.
pub fn parse_labels(data: &Value) -> HashMap<String, String> {
  data["entities"]
    .as_object()
    .map(|entities| {
      entities
        .iter()
        .filter_map(|(qid, entity)| {
          Some((qid.clone(), en_value(&entity["labels"])?))
        })
        .collect()
    })
    .unwrap_or_default()
}

/// Decode a SPARQL result set into raw person records. Bindings without a
/// `person` URI and a `personLabel` are dropped.
pub fn parse_bindings(data: &Value) -> Vec<RawPersonRecord> {
  data["results"]["bindings"]
    .as_array()
    .map(|bindings| {
      bindings
        .iter()
        .filter_map(|binding| {
          let uri = binding["person"]["value"].as_str()?;
          let name = binding["personLabel"]["value"].as_str()?;
          // URI shape: http://www.wikidata.org/entity/Q123
          let id = uri.rsplit('/').next()?.to_string();
          Some(RawPersonRecord {
            id,
            name: Some(name.to_string()),
            birth_date: binding["birth"]["value"]
              .as_str()
              .map(String::from),
            death_date: binding["death"]["value"]
              .as_str()
              .map(String::from),
            image_url: binding["image"]["value"].as_str().map(String::from),
            ..RawPersonRecord::default()
          })
        })
        .collect()
    })
    .unwrap_or_default()
}

/// A stable thumbnail URL for a Commons file name. `Special:FilePath`
/// redirects to the current upload location, so no hash bucketing is
/// needed.
pub fn commons_file_url(filename: &str) -> String {
  format!(
    "https://commons.wikimedia.org/wiki/Special:FilePath/{}?width=200",
    filename.replace(' ', "_")
  )
}

fn en_value(field: &Value) -> Option<String> {
  field["en"]["value"].as_str().map(String::from)
}

/// First claim's item-datavalue id for `prop`.
fn claim_item_id(claims: &Value, prop: &str) -> Option<String> {
  claims[prop][0]["mainsnak"]["datavalue"]["value"]["id"]
    .as_str()
    .map(String::from)
}

/// First claim's time-datavalue for `prop`, raw — signed-year timestamps
/// like `+1936-10-15T00:00:00Z` go to the normalizer untouched.
fn claim_time(claims: &Value, prop: &str) -> Option<String> {
  claims[prop][0]["mainsnak"]["datavalue"]["value"]["time"]
    .as_str()
    .map(String::from)
}

fn gender_token(qid: &str) -> &'static str {
  match qid {
    ITEM_MALE => "male",
    ITEM_FEMALE => "female",
    _ => "other",
  }
}

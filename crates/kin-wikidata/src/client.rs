//! HTTP client for the Wikidata action API and SPARQL endpoint.

use std::time::Duration;

use reqwest::{Client, header};
use serde_json::Value;

use kin_core::{
  normalize::RawPersonRecord,
  source::{RelationRecords, RelationSource, SearchPage},
};

use crate::{
  error::{Error, Result},
  parse,
};

const API_URL: &str = "https://www.wikidata.org/w/api.php";
const SPARQL_URL: &str = "https://query.wikidata.org/sparql";

/// Connection settings for the Wikidata client.
#[derive(Debug, Clone)]
pub struct WikidataConfig {
  /// Sent on every request. Wikimedia policy requires a descriptive agent
  /// with contact information; anonymous agents get throttled hard.
  pub user_agent: String,
  pub api_url:    String,
  pub sparql_url: String,
  /// Search results per page.
  pub page_size:  usize,
}

impl Default for WikidataConfig {
  fn default() -> Self {
    Self {
      user_agent: concat!("kin/", env!("CARGO_PKG_VERSION")).to_string(),
      api_url:    API_URL.to_string(),
      sparql_url: SPARQL_URL.to_string(),
      page_size:  10,
    }
  }
}

/// Client for Wikidata's action API and SPARQL endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct WikidataClient {
  client: Client,
  config: WikidataConfig,
}

impl WikidataClient {
  pub fn new(config: WikidataConfig) -> Result<Self> {
    let client = Client::builder()
      .user_agent(&config.user_agent)
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  async fn get_json(
    &self,
    url: &str,
    params: &[(&str, &str)],
    endpoint: &'static str,
  ) -> Result<Value> {
    let resp = self.client.get(url).query(params).send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status { endpoint, status: resp.status() });
    }
    Ok(resp.json().await?)
  }

  async fn action(
    &self,
    action: &'static str,
    extra: &[(&str, &str)],
  ) -> Result<Value> {
    let mut params =
      vec![("action", action), ("format", "json"), ("language", "en")];
    params.extend_from_slice(extra);
    self.get_json(&self.config.api_url, &params, action).await
  }

  async fn sparql(&self, query: &str) -> Result<Value> {
    let resp = self
      .client
      .get(&self.config.sparql_url)
      .query(&[("format", "json"), ("query", query)])
      .header(header::ACCEPT, "application/sparql-results+json")
      .send()
      .await?;
    if !resp.status().is_success() {
      return Err(Error::Status {
        endpoint: "sparql",
        status:   resp.status(),
      });
    }
    Ok(resp.json().await?)
  }

  /// Run one relation-category query, degrading to an empty list on
  /// failure so the other categories still come through.
  async fn relation_category(
    &self,
    id: &str,
    category: &'static str,
    pattern: String,
  ) -> Vec<RawPersonRecord> {
    match self.sparql(&relation_query(&pattern)).await {
      Ok(data) => parse::parse_bindings(&data),
      Err(e) => {
        tracing::warn!(%id, category, error = %e, "relation query failed");
        Vec::new()
      }
    }
  }

  /// Resolve item ids to English labels with a single batched
  /// `wbgetentities` call.
  async fn labels(
    &self,
    ids: &[String],
  ) -> Result<std::collections::HashMap<String, String>> {
    if ids.is_empty() {
      return Ok(Default::default());
    }
    let joined = ids.join("|");
    let data = self
      .action("wbgetentities", &[("ids", &joined), ("languages", "en")])
      .await?;
    Ok(parse::parse_labels(&data))
  }
}

impl RelationSource for WikidataClient {
  type Error = Error;

  /// `wbsearchentities`, paged through the `continue` offset. Fails soft:
  /// upstream trouble logs a warning and yields an empty page.
  async fn search(&self, query: &str, page: usize) -> Result<SearchPage> {
    let limit = self.config.page_size;
    let offset = (page.max(1) - 1) * limit;
    let result = self
      .action("wbsearchentities", &[
        ("type", "item"),
        ("search", query),
        ("limit", &limit.to_string()),
        ("continue", &offset.to_string()),
      ])
      .await;

    match result {
      Ok(data) => Ok(parse::parse_search_page(&data, page, limit)),
      Err(e) => {
        tracing::warn!(query, error = %e, "search failed");
        Ok(SearchPage { page, page_size: limit, ..SearchPage::default() })
      }
    }
  }

  /// `wbgetentities` for the full biographical record, plus one batched
  /// follow-up to turn birth-place and occupation item ids into labels.
  async fn details(&self, id: &str) -> Result<Option<RawPersonRecord>> {
    let data = self
      .action("wbgetentities", &[("ids", id), ("languages", "en")])
      .await?;

    let Some(parsed) = parse::parse_entity(&data, id) else {
      tracing::warn!(%id, "entity not found");
      return Ok(None);
    };

    let mut wanted = parsed.occupation_ids.clone();
    if let Some(place) = &parsed.birth_place_id {
      wanted.push(place.clone());
    }
    let labels = self.labels(&wanted).await?;

    let mut record = parsed.record;
    record.birth_place =
      parsed.birth_place_id.and_then(|qid| labels.get(&qid).cloned());
    record.occupations = parsed
      .occupation_ids
      .iter()
      .filter_map(|qid| labels.get(qid).cloned())
      .collect();

    Ok(Some(record))
  }

  /// Four SPARQL queries, one per relation category. Siblings are derived
  /// as other children of this person's parents — Wikidata's P3373 is
  /// sparsely populated, shared parentage is not.
  async fn relations(&self, id: &str) -> Result<RelationRecords> {
    let parents = self
      .relation_category(id, "parents", format!("wd:{id} wdt:P22|wdt:P25 ?person ."))
      .await;
    let children = self
      .relation_category(id, "children", format!("?person wdt:P22|wdt:P25 wd:{id} ."))
      .await;
    let spouses = self
      .relation_category(id, "spouses", format!("wd:{id} wdt:P26 ?person ."))
      .await;
    let siblings = self
      .relation_category(
        id,
        "siblings",
        format!(
          "?parent wdt:P22|wdt:P25 wd:{id} .\n  ?parent wdt:P22|wdt:P25 \
           ?person .\n  FILTER(?person != wd:{id})"
        ),
      )
      .await;

    Ok(RelationRecords { parents, children, spouses, siblings })
  }
}

fn relation_query(pattern: &str) -> String {
  format!(
    "SELECT DISTINCT ?person ?personLabel ?birth ?death ?image WHERE {{\n  \
     {pattern}\n  OPTIONAL {{ ?person wdt:P569 ?birth . }}\n  OPTIONAL {{ \
     ?person wdt:P570 ?death . }}\n  OPTIONAL {{ ?person wdt:P18 ?image . \
     }}\n  SERVICE wikibase:label {{ bd:serviceParam wikibase:language \
     \"en\" . }}\n}}"
  )
}

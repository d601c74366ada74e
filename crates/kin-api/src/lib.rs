//! JSON REST API for Kin.
//!
//! Exposes an axum [`Router`] over any [`kin_core::ledger::Ledger`] plus
//! any [`kin_core::source::RelationSource`]. Transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kin_api::api_router(state))
//! ```

pub mod crawls;
pub mod error;
pub mod people;
pub mod search;
pub mod state;

use axum::{
  Router,
  routing::{get, post},
};
use kin_core::{ledger::Ledger, source::RelationSource};

pub use error::ApiError;
pub use state::{AppState, CrawlManager, CrawlStatus};

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S, L>(state: AppState<S, L>) -> Router<()>
where
  S: RelationSource + 'static,
  L: Ledger + 'static,
{
  Router::new()
    // Search
    .route("/search", get(search::handler::<S, L>))
    // People
    .route("/people/{id}", get(people::get_one::<S, L>))
    .route("/people/{id}/relations", get(people::relations::<S, L>))
    .route(
      "/people/{id}/neighborhood",
      get(people::neighborhood_of::<S, L>),
    )
    // Crawls
    .route("/crawls", post(crawls::start::<S, L>))
    .route("/crawls/current", get(crawls::status::<S, L>))
    .route("/crawls/current/stop", post(crawls::stop::<S, L>))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::{
    collections::HashMap,
    sync::{Arc, atomic::Ordering},
    time::Duration,
  };

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use kin_core::{
    ledger::Ledger,
    memory::MemoryLedger,
    normalize::RawPersonRecord,
    source::{RelationRecords, RelationSource, SearchHit, SearchPage},
  };
  use kin_crawl::CrawlConfig;
  use serde_json::Value;
  use tower::ServiceExt as _;

  #[derive(Debug, thiserror::Error)]
  #[error("stub source failure")]
  struct StubError;

  #[derive(Default)]
  struct StubSource {
    details:   HashMap<String, RawPersonRecord>,
    relations: HashMap<String, RelationRecords>,
    hits:      Vec<SearchHit>,
  }

  impl RelationSource for StubSource {
    type Error = StubError;

    async fn search(
      &self,
      _query: &str,
      page: usize,
    ) -> Result<SearchPage, StubError> {
      Ok(SearchPage {
        results: self.hits.clone(),
        total: self.hits.len(),
        page,
        page_size: 10,
        pages: 1,
      })
    }

    async fn details(
      &self,
      id: &str,
    ) -> Result<Option<RawPersonRecord>, StubError> {
      Ok(self.details.get(id).cloned())
    }

    async fn relations(
      &self,
      id: &str,
    ) -> Result<RelationRecords, StubError> {
      Ok(self.relations.get(id).cloned().unwrap_or_default())
    }
  }

  fn make_state() -> AppState<StubSource, MemoryLedger> {
    // Ada (Q1) with mother Anne (Q2); Anne's mother is Elizabeth (Q3).
    let mut source = StubSource::default();
    for (id, name) in
      [("Q1", "Ada"), ("Q2", "Anne"), ("Q3", "Elizabeth")]
    {
      source.details.insert(id.to_string(), RawPersonRecord {
        id: id.to_string(),
        name: Some(name.to_string()),
        ..RawPersonRecord::default()
      });
    }
    source.relations.insert("Q1".to_string(), RelationRecords {
      parents: vec![RawPersonRecord::bare("Q2")],
      ..RelationRecords::default()
    });
    source.relations.insert("Q2".to_string(), RelationRecords {
      parents: vec![RawPersonRecord::bare("Q3")],
      ..RelationRecords::default()
    });
    source.hits = vec![SearchHit {
      id:          "Q1".to_string(),
      label:       "Ada".to_string(),
      description: String::new(),
    }];

    let mut state =
      AppState::new(Arc::new(source), Arc::new(MemoryLedger::default()));
    state.crawl_config =
      CrawlConfig { max_depth: 2, delay: Duration::ZERO };
    state
  }

  async fn request(
    state: AppState<StubSource, MemoryLedger>,
    method: &str,
    uri: &str,
    body: Option<&str>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let req =
      builder.body(Body::from(body.unwrap_or("").to_string())).unwrap();
    api_router(state).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes =
      axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Search ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn search_proxies_source_hits() {
    let resp =
      request(make_state(), "GET", "/search?query=ada", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["results"][0]["id"], "Q1");
    assert_eq!(body["page"], 1);
  }

  #[tokio::test]
  async fn blank_search_query_is_400() {
    let resp =
      request(make_state(), "GET", "/search?query=%20", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── People ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn person_miss_ingests_from_source() {
    let state = make_state();
    let resp = request(state.clone(), "GET", "/people/Q1", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["name"], "Ada");

    // The miss pulled the person and their relation stubs into the ledger.
    assert!(state.ledger.get_person("Q2").await.unwrap().is_some());
    let relations = state.ledger.relations_for("Q1").await.unwrap();
    assert_eq!(relations.parents.len(), 1);
  }

  #[tokio::test]
  async fn unknown_person_is_404() {
    let resp = request(make_state(), "GET", "/people/Q999", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = json_body(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Q999"));
  }

  #[tokio::test]
  async fn relations_endpoint_categorizes() {
    let state = make_state();
    request(state.clone(), "GET", "/people/Q1", None).await;

    let resp =
      request(state, "GET", "/people/Q1/relations", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["parents"][0]["id"], "Q2");
    assert_eq!(body["children"].as_array().unwrap().len(), 0);
  }

  #[tokio::test]
  async fn relations_for_unknown_person_is_404() {
    let resp =
      request(make_state(), "GET", "/people/Q999/relations", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Neighborhood ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn neighborhood_honors_depth_param() {
    let state = make_state();
    // Materialize Q1 (edge Q2→Q1) and Q2 (edge Q3→Q2).
    request(state.clone(), "GET", "/people/Q1", None).await;
    request(state.clone(), "GET", "/people/Q2", None).await;

    let resp = request(
      state,
      "GET",
      "/people/Q1/neighborhood?depth=1",
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let ids: Vec<&str> = body["nodes"]
      .as_array()
      .unwrap()
      .iter()
      .map(|n| n["id"].as_str().unwrap())
      .collect();
    assert_eq!(ids, vec!["Q1", "Q2"]);
    assert_eq!(body["links"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn neighborhood_of_unknown_person_is_404() {
    let resp = request(
      make_state(),
      "GET",
      "/people/Q999/neighborhood",
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Crawls ──────────────────────────────────────────────────────────────────

  async fn wait_until_idle(state: &AppState<StubSource, MemoryLedger>) {
    for _ in 0..100 {
      if !state.crawls.status().running {
        return;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("crawl did not finish");
  }

  #[tokio::test]
  async fn crawl_runs_in_background_and_reports() {
    let state = make_state();
    let resp = request(
      state.clone(),
      "POST",
      "/crawls",
      Some(r#"{"entityId":"Q1","maxDepth":2}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    wait_until_idle(&state).await;
    let resp =
      request(state.clone(), "GET", "/crawls/current", None).await;
    let body = json_body(resp).await;
    assert_eq!(body["running"], false);
    assert_eq!(body["seed"], "Q1");
    assert_eq!(body["summary"]["peopleProcessed"], 3);

    assert!(state.ledger.get_person("Q3").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn crawl_seed_via_search() {
    let state = make_state();
    let resp = request(
      state.clone(),
      "POST",
      "/crawls",
      Some(r#"{"search":"ada"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    wait_until_idle(&state).await;
    assert!(state.ledger.get_person("Q1").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn crawl_body_without_seed_is_400() {
    let resp =
      request(make_state(), "POST", "/crawls", Some("{}")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn stop_without_running_crawl_is_404() {
    let resp =
      request(make_state(), "POST", "/crawls/current/stop", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn crawl_slot_is_exclusive() {
    let manager = CrawlManager::default();
    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
    assert!(manager.try_begin("Q1".to_string(), Arc::clone(&stop)));
    assert!(!manager.try_begin("Q2".to_string(), Arc::clone(&stop)));

    assert!(manager.request_stop());
    assert!(stop.load(Ordering::Relaxed));

    manager.finish(Ok(Default::default()));
    let status = manager.status();
    assert!(!status.running);
    assert!(status.summary.is_some());
    assert!(manager.try_begin("Q2".to_string(), stop));
  }
}

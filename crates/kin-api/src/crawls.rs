//! Handlers for the background-crawl endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/crawls` | Body: `{"entityId":"Q1"}` or `{"search":"ada"}` |
//! | `GET`  | `/crawls/current` | Running flag plus last outcome |
//! | `POST` | `/crawls/current/stop` | 404 when nothing is running |

use std::sync::{Arc, atomic::AtomicBool};

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use kin_core::{ledger::Ledger, source::RelationSource};
use kin_crawl::Crawler;

use crate::{
  error::ApiError,
  state::{AppState, CrawlStatus},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBody {
  /// Crawl from this entity id directly.
  pub entity_id: Option<String>,
  /// Or resolve a search query to its first hit and crawl from there.
  pub search:    Option<String>,
  pub max_depth: Option<u32>,
}

enum Seed {
  Entity(String),
  Search(String),
}

/// `POST /crawls` — claim the crawl slot and spawn the run in the
/// background. 202 with the initial status, or 409 while one is running.
pub async fn start<S, L>(
  State(state): State<AppState<S, L>>,
  Json(body): Json<StartBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RelationSource + 'static,
  L: Ledger + 'static,
{
  let seed = match (body.entity_id, body.search) {
    (Some(id), None) => Seed::Entity(id),
    (None, Some(query)) => Seed::Search(query),
    _ => {
      return Err(ApiError::BadRequest(
        "provide exactly one of entityId or search".to_string(),
      ));
    }
  };

  let mut config = state.crawl_config;
  if let Some(depth) = body.max_depth {
    config.max_depth = depth;
  }

  let label = match &seed {
    Seed::Entity(id) => id.clone(),
    Seed::Search(query) => query.clone(),
  };
  let stop = Arc::new(AtomicBool::new(false));
  if !state.crawls.try_begin(label, Arc::clone(&stop)) {
    return Err(ApiError::Conflict("a crawl is already running".to_string()));
  }

  let task = state.clone();
  tokio::spawn(async move {
    let crawler =
      Crawler::new(task.source.as_ref(), task.ledger.as_ref(), config)
        .with_stop_flag(stop);
    let result = match seed {
      Seed::Entity(id) => Ok(crawler.run(&id).await),
      Seed::Search(query) => crawler.run_from_search(&query).await,
    };
    if let Err(e) = &result {
      tracing::warn!(error = %e, "crawl failed to run");
    }
    task.crawls.finish(result);
  });

  Ok((StatusCode::ACCEPTED, Json(state.crawls.status())))
}

/// `GET /crawls/current`
pub async fn status<S, L>(
  State(state): State<AppState<S, L>>,
) -> Json<CrawlStatus>
where
  S: RelationSource,
  L: Ledger,
{
  Json(state.crawls.status())
}

/// `POST /crawls/current/stop`
///
/// The flag is observed between crawl iterations; the in-flight entity
/// finishes first, so the response status may still show `running`.
pub async fn stop<S, L>(
  State(state): State<AppState<S, L>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RelationSource,
  L: Ledger,
{
  if !state.crawls.request_stop() {
    return Err(ApiError::NotFound("no crawl is running".to_string()));
  }
  Ok((StatusCode::ACCEPTED, Json(state.crawls.status())))
}

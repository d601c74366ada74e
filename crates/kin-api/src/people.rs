//! Handlers for `/people/{id}` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/people/:id` | Fetches from the source on a ledger miss |
//! | `GET`  | `/people/:id/relations` | 404 if the person is unknown |
//! | `GET`  | `/people/:id/neighborhood` | Optional `?depth=<n>`, default 2 |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;

use kin_core::{
  ledger::Ledger,
  person::Person,
  query::{Neighborhood, neighborhood},
  relation::Relations,
  source::RelationSource,
};
use kin_crawl::{IngestError, Ingestor};

use crate::{error::ApiError, state::AppState};

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> ApiError {
  ApiError::Store(Box::new(e))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /people/:id`
///
/// A ledger miss triggers a one-shot ingest against the upstream source,
/// so looking a person up is enough to pull them (and their immediate
/// relations) into the graph. 404 only when the upstream has nothing
/// either.
pub async fn get_one<S, L>(
  State(state): State<AppState<S, L>>,
  Path(id): Path<String>,
) -> Result<Json<Person>, ApiError>
where
  S: RelationSource,
  L: Ledger,
{
  if let Some(person) =
    state.ledger.get_person(&id).await.map_err(store_err)?
  {
    return Ok(Json(person));
  }

  tracing::info!(%id, "ledger miss; ingesting from source");
  let ingestor = Ingestor::new(
    state.source.as_ref(),
    state.ledger.as_ref(),
    state.ingest_pace,
  );
  match ingestor.ingest(&id).await {
    Ok(_) => {}
    Err(IngestError::NotFound(_)) => {
      return Err(ApiError::NotFound(format!("person {id} not found")));
    }
    Err(e @ IngestError::Fetch { .. }) => {
      return Err(ApiError::Upstream(Box::new(e)));
    }
    Err(IngestError::Ledger(e)) => return Err(ApiError::Store(e)),
  }

  state
    .ledger
    .get_person(&id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))
    .map(Json)
}

// ─── Relations ────────────────────────────────────────────────────────────────

/// `GET /people/:id/relations`
pub async fn relations<S, L>(
  State(state): State<AppState<S, L>>,
  Path(id): Path<String>,
) -> Result<Json<Relations>, ApiError>
where
  S: RelationSource,
  L: Ledger,
{
  if state.ledger.get_person(&id).await.map_err(store_err)?.is_none() {
    return Err(ApiError::NotFound(format!("person {id} not found")));
  }
  let relations =
    state.ledger.relations_for(&id).await.map_err(store_err)?;
  Ok(Json(relations))
}

// ─── Neighborhood ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NeighborhoodParams {
  pub depth: Option<u32>,
}

/// `GET /people/:id/neighborhood[?depth=<n>]`
pub async fn neighborhood_of<S, L>(
  State(state): State<AppState<S, L>>,
  Path(id): Path<String>,
  Query(params): Query<NeighborhoodParams>,
) -> Result<Json<Neighborhood>, ApiError>
where
  S: RelationSource,
  L: Ledger,
{
  let depth = params.depth.unwrap_or(2);
  neighborhood(state.ledger.as_ref(), &id, depth)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))
    .map(Json)
}

//! Handler for `GET /search`.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;

use kin_core::{
  ledger::Ledger,
  source::{RelationSource, SearchPage},
};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub query: String,
  pub page:  Option<usize>,
}

/// `GET /search?query=<text>[&page=<n>]` — proxied upstream search.
///
/// The source itself fails soft, so upstream trouble comes back as an
/// empty page rather than a 5xx.
pub async fn handler<S, L>(
  State(state): State<AppState<S, L>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<SearchPage>, ApiError>
where
  S: RelationSource,
  L: Ledger,
{
  if params.query.trim().is_empty() {
    return Err(ApiError::BadRequest("query must not be empty".to_string()));
  }

  let page = state
    .source
    .search(&params.query, params.page.unwrap_or(1).max(1))
    .await
    .map_err(|e| ApiError::Upstream(Box::new(e)))?;
  Ok(Json(page))
}

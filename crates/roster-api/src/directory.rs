//! Handlers for `/directory` — the privileged dashboard's data source.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/directory?offset=&limit=&q=` | Page + total, insertion order |
//! | `GET`  | `/directory/stats` | Total + per-role counts |
//!
//! Both require admin or hr-manager; the policy check happens before any
//! data is fetched.

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use roster_core::{role::Role, store::{DirectoryStore, PageQuery}};

use crate::{
  AppState, accounts::IdentityDto, auth::AuthedActor, error::ApiError,
};

/// Pages default to 50 entries when the caller sets no limit.
const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub offset: Option<usize>,
  pub limit:  Option<usize>,
  /// Free-text filter over handle and email.
  pub q:      Option<String>,
}

/// `GET /directory`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError>
where
  S: DirectoryStore + Send + Sync + 'static,
{
  let query = PageQuery {
    offset: params.offset.unwrap_or(0),
    limit:  Some(params.limit.unwrap_or(DEFAULT_PAGE_SIZE)),
    search: params.q.filter(|q| !q.trim().is_empty()),
  };

  let page = state.directory.list(&actor, &query).await?;
  let users: Vec<IdentityDto> =
    page.items.into_iter().map(IdentityDto::from).collect();
  Ok(Json(json!({ "users": users, "total": page.total })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
  pub total:   u64,
  pub by_role: BTreeMap<Role, u64>,
}

/// `GET /directory/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
) -> Result<Json<StatsDto>, ApiError>
where
  S: DirectoryStore + Send + Sync + 'static,
{
  let stats = state.directory.stats(&actor).await?;
  Ok(Json(StatsDto { total: stats.total, by_role: stats.by_role }))
}

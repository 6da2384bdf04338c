//! Handler for `POST /usernames/resolve`.
//!
//! Unauthenticated by design: the external sign-up flow calls it before a
//! session exists. It leaks nothing beyond whether a numbered variant of a
//! handle the caller already knows is free.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use roster_core::store::DirectoryStore;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveBody {
  pub base_username: Option<String>,
}

/// `POST /usernames/resolve` — body: `{"baseUsername": "jane.doe"}`
pub async fn resolve<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<ResolveBody>,
) -> Result<Json<Value>, ApiError>
where
  S: DirectoryStore + Send + Sync + 'static,
{
  let base = body
    .base_username
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::BadRequest("baseUsername is required".into()))?;

  let username = state.manager.resolve_handle(base).await?;
  Ok(Json(json!({ "username": username })))
}

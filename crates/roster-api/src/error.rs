//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Boundary status semantics: 400 for missing or malformed input, 401 for
//! missing/bad credentials, 403 for a policy denial (distinct, so the
//! presentation layer can redirect instead of showing a form error), 404
//! for an absent identity, 409 for a uniqueness conflict, 500 for a store
//! failure — which is never silently folded into a success response.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self {
    use roster_core::Error as E;
    match e {
      E::Forbidden(msg) => ApiError::Forbidden(msg),
      E::Validation(msg) => ApiError::BadRequest(msg),
      E::IdentityNotFound(id) => {
        ApiError::NotFound(format!("identity {id} not found"))
      }
      E::HandleTaken(h) => ApiError::Conflict(format!("handle {h:?} taken")),
      E::EmailTaken(m) => ApiError::Conflict(format!("email {m:?} in use")),
      // A partial write failed the overall operation; the caller retries.
      e @ E::PartialWrite { .. } => ApiError::Store(Box::new(e)),
      E::Store(source) => ApiError::Store(source),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "unauthorized".to_owned())
      }
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let mut res =
      (status, Json(json!({ "error": message }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"roster\""),
      );
    }
    res
  }
}

//! JSON REST API for the Roster operations console.
//!
//! Exposes an axum [`Router`] backed by any
//! [`roster_core::store::DirectoryStore`]. TLS and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(state))
//! ```

pub mod accounts;
pub mod auth;
pub mod contact;
pub mod directory;
pub mod error;
pub mod username;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::{
  account::AccountManager, directory::Directory, store::DirectoryStore,
};

use auth::AuthConfig;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub manager:   AccountManager<S>,
  pub directory: Directory<S>,
  pub auth:      Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      manager:   self.manager.clone(),
      directory: self.directory.clone(),
      auth:      Arc::clone(&self.auth),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: DirectoryStore + Send + Sync + 'static,
{
  Router::new()
    // Username resolution (unauthenticated; serves the sign-up flow)
    .route("/usernames/resolve", post(username::resolve::<S>))
    // Accounts
    .route("/accounts", post(accounts::create::<S>))
    .route(
      "/accounts/{id}",
      get(accounts::get_one::<S>)
        .patch(accounts::update::<S>)
        .delete(accounts::delete_one::<S>),
    )
    .route(
      "/accounts/{id}/contact",
      get(contact::get_one::<S>).put(contact::put_one::<S>),
    )
    // Directory
    .route("/directory", get(directory::list::<S>))
    .route("/directory/stats", get(directory::stats::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

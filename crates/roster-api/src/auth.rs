//! HTTP Basic-auth verification and the [`AuthedActor`] extractor.
//!
//! Credential storage and session issuance belong to the external auth
//! provider; what this module holds is the provider's local stand-in — a
//! configured list of principals with argon2 PHC hashes. An actor's roles
//! are read fresh from the store on every request, so a role revocation
//! takes effect immediately; until a principal's identity row exists, the
//! roles configured alongside the hash apply (the bootstrap window).

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use uuid::Uuid;

use roster_core::{policy::Actor, role::RoleSet, store::DirectoryStore};

use crate::{AppState, error::ApiError};

// ─── Configuration ───────────────────────────────────────────────────────────

/// One principal the console accepts credentials for.
#[derive(Clone)]
pub struct Principal {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  /// The identity this principal acts as.
  pub identity_id:   Uuid,
  /// Roles assumed while no identity row exists yet.
  pub roles:         RoleSet,
}

/// Credentials accepted as valid for this server instance.
#[derive(Clone, Default)]
pub struct AuthConfig {
  pub principals: Vec<Principal>,
}

// ─── Verification ────────────────────────────────────────────────────────────

/// Verify Basic credentials against the configured principals.
pub fn verify_basic<'a>(
  headers: &HeaderMap,
  config: &'a AuthConfig,
) -> Result<&'a Principal, ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds =
    std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let principal = config
    .principals
    .iter()
    .find(|p| p.username == username)
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&principal.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(principal)
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Present in a handler's signature means the request carried valid
/// credentials; wraps the resolved [`Actor`].
pub struct AuthedActor(pub Actor);

impl<S> FromRequestParts<AppState<S>> for AuthedActor
where
  S: DirectoryStore + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let principal = verify_basic(&parts.headers, &state.auth)?;

    let roles = match state
      .manager
      .store()
      .get_identity(principal.identity_id)
      .await
    {
      Ok(Some(identity)) => identity.roles,
      Ok(None) => principal.roles.clone(),
      Err(e) => return Err(ApiError::Store(Box::new(e))),
    };

    Ok(AuthedActor(Actor { id: principal.identity_id, roles }))
  }
}

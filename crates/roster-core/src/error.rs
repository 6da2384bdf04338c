//! Error types for `roster-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Policy denial. Distinct from validation so callers can redirect
  /// instead of showing a form error.
  #[error("forbidden: {0}")]
  Forbidden(String),

  /// A required field is missing or malformed. Rejected before any
  /// mutation is attempted.
  #[error("validation: {0}")]
  Validation(String),

  #[error("identity not found: {0}")]
  IdentityNotFound(Uuid),

  /// The handle was claimed between the prefix scan and the insert.
  /// The create path retries with the next candidate.
  #[error("handle already taken: {0}")]
  HandleTaken(String),

  #[error("email already in use: {0}")]
  EmailTaken(String),

  /// The identity write committed but the contact write did not. The
  /// identity stands — contact absence is a valid state — and the caller
  /// is expected to retry the contact write.
  #[error("account {id} created but contact write failed: {source}")]
  PartialWrite {
    id:     Uuid,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type for `roster-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// UNIQUE constraint violation on `identities.handle`.
  #[error("handle already taken: {0}")]
  HandleConflict(String),

  /// UNIQUE constraint violation on `identities.email`.
  #[error("email already in use: {0}")]
  EmailConflict(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

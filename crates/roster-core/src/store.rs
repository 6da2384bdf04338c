//! The `DirectoryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers (`roster-api`, the account manager) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  contact::ContactDetails,
  identity::{Identity, IdentityPatch, NewIdentity},
  role::RoleSet,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`DirectoryStore::list_identities`].
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
  pub offset: usize,
  pub limit:  Option<usize>,
  /// Free-text filter applied over handle and email.
  pub search: Option<String>,
}

/// Which uniqueness constraint an insert or update tripped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
  Handle,
  Email,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a roster storage backend.
///
/// The store provides durable single-row atomicity and the two secondary
/// lookups the core needs: a prefix scan over handles and offset/limit
/// pagination in insertion order. It enforces handle and email uniqueness
/// as hard constraints; violations must be distinguishable via
/// [`DirectoryStore::classify_conflict`] so the create path can retry with
/// the next handle candidate.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  /// Create and persist a new identity. The id and creation timestamp are
  /// set by the store.
  fn create_identity(
    &self,
    input: NewIdentity,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  /// Retrieve an identity by id. Returns `None` if not found.
  fn get_identity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `false` if no such identity exists.
  fn update_identity(
    &self,
    id: Uuid,
    patch: IdentityPatch,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete an identity row. Returns `false` if no such identity exists.
  fn delete_identity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Secondary lookups ─────────────────────────────────────────────────

  /// All handles starting with `prefix` — the resolver's collision set.
  fn handles_with_prefix<'a>(
    &'a self,
    prefix: &'a str,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;

  /// A page of identities in insertion order, with optional text search
  /// over handle and email.
  fn list_identities<'a>(
    &'a self,
    query: &'a PageQuery,
  ) -> impl Future<Output = Result<Vec<Identity>, Self::Error>> + Send + 'a;

  /// Total identity count, recomputed at call time. When `search` is set
  /// the same handle/email filter as [`DirectoryStore::list_identities`]
  /// applies.
  fn count_identities<'a>(
    &'a self,
    search: Option<&'a str>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Every stored role set — the raw input for per-role aggregation.
  /// Deliberately a re-scan; no persistent counters exist.
  fn role_sets(
    &self,
  ) -> impl Future<Output = Result<Vec<RoleSet>, Self::Error>> + Send + '_;

  // ── Contact details ───────────────────────────────────────────────────

  /// Fetch the contact record for an identity; `None` is a valid result.
  fn get_contact(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Option<ContactDetails>, Self::Error>> + Send + '_;

  /// Atomically replace the whole contact record for its owner. Fields the
  /// caller leaves empty end up cleared — full-replace, not field patch.
  fn put_contact(
    &self,
    details: ContactDetails,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete the contact record. Returns `false` if none existed, which is
  /// not an error.
  fn delete_contact(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Error classification ──────────────────────────────────────────────

  /// Map a backend error to the uniqueness constraint it violated, if any.
  fn classify_conflict(err: &Self::Error) -> Option<Conflict>;
}

//! Identity — the authenticable principal behind an account.
//!
//! An identity holds only the fields the console governs: a handle derived
//! from the person's name, an email, and a role set. Credentials live with
//! the external auth provider, never here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::RoleSet;

/// One authenticable principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
  pub identity_id: Uuid,
  /// Display name / username. Unique by convention among active identities;
  /// the store additionally enforces it as a hard constraint.
  pub handle:      String,
  pub email:       String,
  pub roles:       RoleSet,
  /// Server-assigned; never changes after creation.
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::DirectoryStore::create_identity`].
/// `identity_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewIdentity {
  pub handle: String,
  pub email:  String,
  pub roles:  RoleSet,
}

/// A partial update to an identity. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
  pub handle: Option<String>,
  pub email:  Option<String>,
  pub roles:  Option<RoleSet>,
}

impl IdentityPatch {
  pub fn is_empty(&self) -> bool {
    self.handle.is_none() && self.email.is_none() && self.roles.is_none()
  }
}

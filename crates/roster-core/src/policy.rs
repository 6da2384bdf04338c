//! Role Policy — the single source of truth for who may do what.
//!
//! Everything here is a pure predicate over the actor's roles (and, where
//! relevant, the target's roles or id). The policy never touches state; it
//! only answers, and a "no" is always the distinct [`Error::Forbidden`]
//! outcome, never an empty result.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  role::{ALL_ROLES, Role, RoleSet},
};

// ─── Actor ───────────────────────────────────────────────────────────────────

/// The authenticated principal a request runs as, as reported by the
/// external auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
  pub id:    Uuid,
  pub roles: RoleSet,
}

// ─── Actions ─────────────────────────────────────────────────────────────────

/// An operation requiring authorization. Role-carrying variants name the
/// *target* role set the operation would touch; for role assignment that is
/// the union of the old and new sets, so an hr-manager can neither grant
/// nor revoke `admin` through a partial-set trick.
#[derive(Debug, Clone)]
pub enum Action {
  /// List or search identities.
  ListAccounts,
  /// View the directory dashboard (pages, aggregates).
  ViewDirectory,
  CreateAccount { target: RoleSet },
  AssignRoles { target: RoleSet },
  DeleteAccount { target: RoleSet },
  ReadAccount { target: Uuid },
  UpdateEmail { target: Uuid },
  UpdateContact { target: Uuid },
  /// Change a handle (and the name it derives from). Privileged-only:
  /// self-service renames are deliberately not a thing.
  Rename { target: Uuid },
}

impl Action {
  fn describe(&self) -> &'static str {
    match self {
      Self::ListAccounts => "list accounts",
      Self::ViewDirectory => "view directory",
      Self::CreateAccount { .. } => "create account",
      Self::AssignRoles { .. } => "assign roles",
      Self::DeleteAccount { .. } => "delete account",
      Self::ReadAccount { .. } => "read account",
      Self::UpdateEmail { .. } => "update email",
      Self::UpdateContact { .. } => "update contact details",
      Self::Rename { .. } => "rename account",
    }
  }
}

// ─── Predicates ──────────────────────────────────────────────────────────────

/// The roles an actor may assign to others: exactly the roles at or below
/// their own privilege. Base-role actors assign nothing.
pub fn assignable_roles(actor: &RoleSet) -> &'static [Role] {
  if actor.contains(Role::Admin) {
    &ALL_ROLES
  } else if actor.contains(Role::HrManager) {
    &ALL_ROLES[1..]
  } else {
    &[]
  }
}

/// Whether the actor may see the directory dashboard at all. Checked before
/// any data is fetched.
pub fn can_view_directory(actor: &RoleSet) -> bool {
  actor.is_privileged()
}

/// Authorize `action` for `actor`. Pure; returns [`Error::Forbidden`] on
/// denial.
pub fn authorize(actor: &Actor, action: &Action) -> Result<()> {
  if actor.roles.contains(Role::Admin) {
    return Ok(());
  }

  let allowed = if actor.roles.contains(Role::HrManager) {
    match action {
      Action::ListAccounts | Action::ViewDirectory => true,
      // The admin role is beyond an hr-manager's reach, in any direction.
      Action::CreateAccount { target }
      | Action::AssignRoles { target }
      | Action::DeleteAccount { target } => !target.contains(Role::Admin),
      Action::ReadAccount { .. }
      | Action::UpdateEmail { .. }
      | Action::UpdateContact { .. }
      | Action::Rename { .. } => true,
    }
  } else {
    // Base role: own record only, and never the handle or the role set.
    match action {
      Action::ReadAccount { target }
      | Action::UpdateEmail { target }
      | Action::UpdateContact { target } => *target == actor.id,
      _ => false,
    }
  };

  if allowed {
    Ok(())
  } else {
    Err(Error::Forbidden(action.describe().to_owned()))
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

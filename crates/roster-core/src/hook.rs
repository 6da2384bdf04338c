//! Notification hook toward the external auth provider.
//!
//! The auth provider owns sessions and credentials; this core only tells it
//! when an account it may hold sessions for has been created, re-roled, or
//! deleted. Notifications fire after the store write succeeds and are
//! fire-and-forget — a provider that does nothing is a valid provider.

use uuid::Uuid;

use crate::{identity::Identity, role::RoleSet};

/// Receiver for account lifecycle notifications.
pub trait AuthHook: Send + Sync {
  fn account_created(&self, identity: &Identity);
  fn roles_changed(&self, id: Uuid, roles: &RoleSet);
  fn account_deleted(&self, id: Uuid);
}

/// The default hook: ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl AuthHook for NoopHook {
  fn account_created(&self, _identity: &Identity) {}
  fn roles_changed(&self, _id: Uuid, _roles: &RoleSet) {}
  fn account_deleted(&self, _id: Uuid) {}
}

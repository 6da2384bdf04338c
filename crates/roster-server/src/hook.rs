//! Lifecycle hook that announces account changes via tracing.
//!
//! Stands in for the callback the external auth provider would receive;
//! swap in a real client here once provisioning is wired up.

use roster_core::{hook::AuthHook, identity::Identity, role::RoleSet};
use uuid::Uuid;

pub struct TracingHook;

impl AuthHook for TracingHook {
  fn account_created(&self, identity: &Identity) {
    tracing::info!(
      id = %identity.identity_id,
      handle = %identity.handle,
      roles = %identity.roles.to_joined(),
      "account created"
    );
  }

  fn roles_changed(&self, id: Uuid, roles: &RoleSet) {
    tracing::info!(id = %id, roles = %roles.to_joined(), "roles changed");
  }

  fn account_deleted(&self, id: Uuid) {
    tracing::info!(id = %id, "account deleted");
  }
}

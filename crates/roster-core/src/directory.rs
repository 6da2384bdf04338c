//! The directory service — paginated listing and aggregates over all
//! identities, for the privileged dashboard.
//!
//! Ordering is stable insertion order; pagination is offset/limit, so
//! concurrent inserts can shift page membership between requests. The
//! aggregates re-scan the identity set at request time — they are
//! eventually consistent with the latest write and never a snapshot shared
//! with the page itself.

use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;

use crate::{
  Error, Result,
  identity::Identity,
  policy::{Action, Actor, authorize},
  role::{ALL_ROLES, Role},
  store::{DirectoryStore, PageQuery},
};

/// One page of the directory plus the total it was cut from.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryPage {
  pub items: Vec<Identity>,
  pub total: u64,
}

/// Request-time aggregate counts.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryStats {
  pub total:   u64,
  pub by_role: BTreeMap<Role, u64>,
}

/// Read-only view over the roster. Requires admin or hr-manager for every
/// operation, checked before any data is fetched.
pub struct Directory<S> {
  store: Arc<S>,
}

impl<S> Clone for Directory<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S: DirectoryStore> Directory<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// A page of identities in insertion order, with the current total.
  /// `total` ignores the page window; a search filter applies to both.
  pub async fn list(
    &self,
    actor: &Actor,
    query: &PageQuery,
  ) -> Result<DirectoryPage> {
    authorize(actor, &Action::ListAccounts)?;
    let items = self
      .store
      .list_identities(query)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    let total = self
      .store
      .count_identities(query.search.as_deref())
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    Ok(DirectoryPage { items, total })
  }

  /// How many identities hold `role`, by re-scanning the stored role sets.
  pub async fn count_by_role(&self, actor: &Actor, role: Role) -> Result<u64> {
    authorize(actor, &Action::ViewDirectory)?;
    let sets = self
      .store
      .role_sets()
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    Ok(sets.iter().filter(|s| s.contains(role)).count() as u64)
  }

  /// Total plus a per-role breakdown, computed from one scan.
  pub async fn stats(&self, actor: &Actor) -> Result<DirectoryStats> {
    authorize(actor, &Action::ViewDirectory)?;
    let sets = self
      .store
      .role_sets()
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    let mut by_role = BTreeMap::new();
    for role in ALL_ROLES {
      let count = sets.iter().filter(|s| s.contains(role)).count() as u64;
      by_role.insert(role, count);
    }
    Ok(DirectoryStats { total: sets.len() as u64, by_role })
  }
}

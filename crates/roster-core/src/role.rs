//! Roles and role sets.
//!
//! A role is a named capability bundle; an identity holds a set of them. The
//! set is the only representation the core works with — the comma-joined
//! textual form the store keeps exists solely at the storage edge, via
//! [`RoleSet::to_joined`] and [`RoleSet::from_joined`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ─── Role ────────────────────────────────────────────────────────────────────

/// A named capability bundle. Variant order doubles as privilege order:
/// `Admin` outranks `HrManager` outranks `User`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
  Admin,
  HrManager,
  User,
}

/// Every role, most privileged first.
pub const ALL_ROLES: [Role; 3] = [Role::Admin, Role::HrManager, Role::User];

impl Role {
  /// The textual form used in the joined storage representation.
  /// Must match the `rename_all = "kebab-case"` serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::HrManager => "hr-manager",
      Self::User => "user",
    }
  }

  /// Parse the textual form back; `None` for unknown strings.
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim() {
      "admin" => Some(Self::Admin),
      "hr-manager" => Some(Self::HrManager),
      "user" => Some(Self::User),
      _ => None,
    }
  }
}

impl std::fmt::Display for Role {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── RoleSet ─────────────────────────────────────────────────────────────────

/// The set of roles held by an identity. Never empty: stripping every
/// privilege leaves the base `user` role behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Role>", into = "Vec<Role>")]
pub struct RoleSet(BTreeSet<Role>);

impl Default for RoleSet {
  fn default() -> Self {
    Self(BTreeSet::from([Role::User]))
  }
}

impl RoleSet {
  /// Build a set from any iterator of roles; an empty input yields the
  /// base-role set.
  pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
    let set: BTreeSet<Role> = roles.into_iter().collect();
    if set.is_empty() { Self::default() } else { Self(set) }
  }

  pub fn contains(&self, role: Role) -> bool {
    self.0.contains(&role)
  }

  /// Admin or hr-manager — the roles that unlock the console's
  /// administrative surfaces.
  pub fn is_privileged(&self) -> bool {
    self.contains(Role::Admin) || self.contains(Role::HrManager)
  }

  /// Set union, preserving the non-empty invariant by construction.
  pub fn union(&self, other: &RoleSet) -> RoleSet {
    Self(self.0.union(&other.0).copied().collect())
  }

  pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
    self.0.iter().copied()
  }

  /// The ordered comma-joined storage form, e.g. `"admin,user"`.
  pub fn to_joined(&self) -> String {
    let parts: Vec<&str> = self.0.iter().map(Role::as_str).collect();
    parts.join(",")
  }

  /// Parse the joined storage form. Unknown segments are dropped; an empty
  /// or entirely unknown string decodes to the base-role set.
  pub fn from_joined(s: &str) -> Self {
    Self::new(s.split(',').filter_map(Role::parse))
  }
}

impl From<Vec<Role>> for RoleSet {
  fn from(roles: Vec<Role>) -> Self {
    Self::new(roles)
  }
}

impl From<RoleSet> for Vec<Role> {
  fn from(set: RoleSet) -> Self {
    set.0.into_iter().collect()
  }
}

impl FromIterator<Role> for RoleSet {
  fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
    Self::new(iter)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_set_defaults_to_base_role() {
    let set = RoleSet::new([]);
    assert!(set.contains(Role::User));
    assert!(!set.is_privileged());
  }

  #[test]
  fn joined_form_is_ordered() {
    let set = RoleSet::new([Role::User, Role::Admin]);
    assert_eq!(set.to_joined(), "admin,user");
  }

  #[test]
  fn joined_roundtrip() {
    let set = RoleSet::new([Role::HrManager, Role::User]);
    assert_eq!(RoleSet::from_joined(&set.to_joined()), set);
  }

  #[test]
  fn from_joined_tolerates_whitespace_and_unknowns() {
    let set = RoleSet::from_joined(" admin , hr-manager ,superuser");
    assert!(set.contains(Role::Admin));
    assert!(set.contains(Role::HrManager));
    assert!(!set.contains(Role::User));
  }

  #[test]
  fn from_joined_empty_is_base_role() {
    assert_eq!(RoleSet::from_joined(""), RoleSet::default());
  }

  #[test]
  fn union_merges() {
    let a = RoleSet::new([Role::User]);
    let b = RoleSet::new([Role::Admin]);
    let u = a.union(&b);
    assert!(u.contains(Role::User));
    assert!(u.contains(Role::Admin));
  }
}

//! End-to-end tests driving [`AccountManager`] and [`Directory`] against an
//! in-memory `SqliteStore`.

use std::sync::{Arc, Mutex};

use roster_core::{
  Error,
  account::{AccountManager, AccountUpdate, NewAccount, PersonName},
  contact::{ContactDetails, ContactFields},
  directory::Directory,
  hook::AuthHook,
  identity::{Identity, IdentityPatch, NewIdentity},
  policy::Actor,
  role::{Role, RoleSet},
  store::{Conflict, DirectoryStore, PageQuery},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn manager() -> AccountManager<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  AccountManager::new(Arc::new(store))
}

fn admin() -> Actor {
  Actor { id: Uuid::new_v4(), roles: RoleSet::new([Role::Admin]) }
}

fn hr_manager() -> Actor {
  Actor { id: Uuid::new_v4(), roles: RoleSet::new([Role::HrManager]) }
}

fn base_actor(id: Uuid) -> Actor {
  Actor { id, roles: RoleSet::default() }
}

fn new_account(first: &str, last: &str, email: &str) -> NewAccount {
  NewAccount {
    name:    PersonName {
      first_name: first.to_string(),
      surname:    last.to_string(),
    },
    email:   email.to_string(),
    roles:   RoleSet::default(),
    contact: None,
  }
}

fn some_contact() -> ContactFields {
  ContactFields {
    address_line1: Some("1 High Street".into()),
    address_line2: None,
    city:          Some("London".into()),
    postcode:      Some("AB1 2CD".into()),
    country:       Some("UK".into()),
  }
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_derives_handle_from_name() {
  let m = manager().await;

  let account = m
    .create_account(&admin(), new_account("Jane", "Doe", "jane@example.com"))
    .await
    .unwrap();
  assert_eq!(account.identity.handle, "jane.doe");
  assert!(account.identity.roles.contains(Role::User));
  assert!(account.contact.is_none());
}

#[tokio::test]
async fn create_numbers_colliding_handles() {
  let m = manager().await;
  let actor = admin();

  for (n, email) in ["a@example.com", "b@example.com", "c@example.com"]
    .iter()
    .enumerate()
  {
    let account = m
      .create_account(&actor, new_account("Jane", "Doe", email))
      .await
      .unwrap();
    let expected =
      if n == 0 { "jane.doe".to_string() } else { format!("jane.doe{n}") };
    assert_eq!(account.identity.handle, expected);
  }
}

#[tokio::test]
async fn create_strips_whitespace_and_lowercases() {
  let m = manager().await;

  let account = m
    .create_account(
      &admin(),
      new_account("  Mary Anne ", " De La Cruz ", "mary@example.com"),
    )
    .await
    .unwrap();
  assert_eq!(account.identity.handle, "maryanne.delacruz");
}

#[tokio::test]
async fn create_with_contact_stores_both_records() {
  let m = manager().await;
  let mut new = new_account("Jane", "Doe", "jane@example.com");
  new.contact = Some(some_contact());

  let account = m.create_account(&admin(), new).await.unwrap();
  let contact = account.contact.expect("contact stored");
  assert_eq!(contact.owner_id, account.identity.identity_id);
  assert_eq!(contact.city.as_deref(), Some("London"));
}

#[tokio::test]
async fn create_rejects_duplicate_email() {
  let m = manager().await;
  let actor = admin();

  m.create_account(&actor, new_account("Jane", "Doe", "jane@example.com"))
    .await
    .unwrap();
  let err = m
    .create_account(&actor, new_account("John", "Roe", "jane@example.com"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmailTaken(_)));
}

#[tokio::test]
async fn hr_manager_creates_non_admin_but_not_admin() {
  let m = manager().await;
  let actor = hr_manager();

  let mut ok = new_account("Helen", "Rivers", "helen@example.com");
  ok.roles = RoleSet::new([Role::HrManager, Role::User]);
  m.create_account(&actor, ok).await.unwrap();

  let mut denied = new_account("Amy", "Admin", "amy@example.com");
  denied.roles = RoleSet::new([Role::Admin]);
  let err = m.create_account(&actor, denied).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn base_role_cannot_create() {
  let m = manager().await;
  let err = m
    .create_account(
      &base_actor(Uuid::new_v4()),
      new_account("Jane", "Doe", "jane@example.com"),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn create_validates_name_and_email() {
  let m = manager().await;
  let actor = admin();

  let err = m
    .create_account(&actor, new_account("", "Doe", "jane@example.com"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let err = m
    .create_account(&actor, new_account("Jane", "Doe", "  "))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

// ─── Resolution ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_handle_requires_a_base() {
  let m = manager().await;
  let err = m.resolve_handle("  ").await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn resolve_handle_reuses_gaps() {
  let m = manager().await;
  let actor = admin();

  for email in ["a@example.com", "b@example.com"] {
    m.create_account(&actor, new_account("Jane", "Doe", email))
      .await
      .unwrap();
  }
  assert_eq!(m.resolve_handle("jane.doe").await.unwrap(), "jane.doe2");

  // Freeing the unnumbered slot makes it the next candidate again.
  let page = m
    .store()
    .list_identities(&PageQuery::default())
    .await
    .unwrap();
  let jane = page.iter().find(|i| i.handle == "jane.doe").unwrap();
  m.delete_account(&actor, jane.identity_id).await.unwrap();
  assert_eq!(m.resolve_handle("jane.doe").await.unwrap(), "jane.doe");
}

// ─── Self-service ────────────────────────────────────────────────────────────

async fn seeded_self(m: &AccountManager<SqliteStore>) -> Identity {
  m.create_account(&admin(), new_account("Sam", "Self", "sam@example.com"))
    .await
    .unwrap()
    .identity
}

#[tokio::test]
async fn base_role_reads_and_edits_own_account_only() {
  let m = manager().await;
  let own = seeded_self(&m).await;
  let other = m
    .create_account(&admin(), new_account("Jane", "Doe", "jane@example.com"))
    .await
    .unwrap()
    .identity;
  let actor = base_actor(own.identity_id);

  // Own record: read, email change, contact replace all succeed.
  let account = m.get_account(&actor, own.identity_id).await.unwrap();
  assert_eq!(account.identity.handle, "sam.self");

  let update =
    AccountUpdate { email: Some("sam2@example.com".into()), ..Default::default() };
  m.update_account(&actor, own.identity_id, update).await.unwrap();

  m.put_contact(&actor, own.identity_id, some_contact())
    .await
    .unwrap();

  // Someone else's record: all denied.
  let err = m.get_account(&actor, other.identity_id).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));

  let update =
    AccountUpdate { email: Some("x@example.com".into()), ..Default::default() };
  let err = m
    .update_account(&actor, other.identity_id, update)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn base_role_cannot_rename_itself() {
  let m = manager().await;
  let own = seeded_self(&m).await;
  let actor = base_actor(own.identity_id);

  let update = AccountUpdate {
    name: Some(PersonName {
      first_name: "Samuel".into(),
      surname:    "Self".into(),
    }),
    ..Default::default()
  };
  let err = m.update_account(&actor, own.identity_id, update).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn base_role_cannot_change_own_roles() {
  let m = manager().await;
  let own = seeded_self(&m).await;
  let actor = base_actor(own.identity_id);

  let update = AccountUpdate {
    roles: Some(RoleSet::new([Role::HrManager])),
    ..Default::default()
  };
  let err = m.update_account(&actor, own.identity_id, update).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn role_change_checks_the_union_of_old_and_new() {
  let m = manager().await;
  let root = admin();
  let mut new = new_account("Amy", "Admin", "amy@example.com");
  new.roles = RoleSet::new([Role::Admin]);
  let target = m.create_account(&root, new).await.unwrap().identity;

  // Stripping admin still requires authority over the admin role.
  let update = AccountUpdate {
    roles: Some(RoleSet::new([Role::User])),
    ..Default::default()
  };
  let err = m
    .update_account(&hr_manager(), target.identity_id, update.clone())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));

  m.update_account(&root, target.identity_id, update)
    .await
    .unwrap();
  let fetched = m.get_account(&root, target.identity_id).await.unwrap();
  assert!(!fetched.identity.roles.contains(Role::Admin));
  assert!(fetched.identity.roles.contains(Role::User));
}

#[tokio::test]
async fn rename_rederives_only_when_the_base_changes() {
  let m = manager().await;
  let root = admin();
  let target = m
    .create_account(&root, new_account("Jane", "Doe", "jane@example.com"))
    .await
    .unwrap()
    .identity;

  // Same name resubmitted: handle untouched.
  let update = AccountUpdate {
    name: Some(PersonName { first_name: "Jane".into(), surname: "Doe".into() }),
    ..Default::default()
  };
  m.update_account(&root, target.identity_id, update)
    .await
    .unwrap();
  let fetched = m.get_account(&root, target.identity_id).await.unwrap();
  assert_eq!(fetched.identity.handle, "jane.doe");

  let update = AccountUpdate {
    name: Some(PersonName { first_name: "Janet".into(), surname: "Doe".into() }),
    ..Default::default()
  };
  m.update_account(&root, target.identity_id, update)
    .await
    .unwrap();
  let fetched = m.get_account(&root, target.identity_id).await.unwrap();
  assert_eq!(fetched.identity.handle, "janet.doe");
}

#[tokio::test]
async fn contact_update_replaces_the_whole_record() {
  let m = manager().await;
  let root = admin();
  let mut new = new_account("Jane", "Doe", "jane@example.com");
  new.contact = Some(some_contact());
  let target = m.create_account(&root, new).await.unwrap().identity;

  let update = AccountUpdate {
    contact: Some(ContactFields {
      address_line1: Some("2 Low Road".into()),
      ..Default::default()
    }),
    ..Default::default()
  };
  m.update_account(&root, target.identity_id, update)
    .await
    .unwrap();

  let contact = m
    .get_contact(&root, target.identity_id)
    .await
    .unwrap()
    .expect("contact present");
  assert_eq!(contact.address_line1.as_deref(), Some("2 Low Road"));
  assert!(contact.city.is_none());
  assert!(contact.postcode.is_none());
}

#[tokio::test]
async fn rename_keeps_a_numbered_handle_when_the_name_is_unchanged() {
  let m = manager().await;
  let root = admin();
  m.create_account(&root, new_account("Jane", "Doe", "a@example.com"))
    .await
    .unwrap();
  let second = m
    .create_account(&root, new_account("Jane", "Doe", "b@example.com"))
    .await
    .unwrap()
    .identity;
  assert_eq!(second.handle, "jane.doe1");

  let update = AccountUpdate {
    name: Some(PersonName { first_name: "Jane".into(), surname: "Doe".into() }),
    ..Default::default()
  };
  m.update_account(&root, second.identity_id, update)
    .await
    .unwrap();

  let fetched = m.get_account(&root, second.identity_id).await.unwrap();
  assert_eq!(fetched.identity.handle, "jane.doe1");
}

#[tokio::test]
async fn update_of_missing_account_is_not_found() {
  let m = manager().await;
  let update =
    AccountUpdate { email: Some("x@example.com".into()), ..Default::default() };
  let err = m
    .update_account(&admin(), Uuid::new_v4(), update)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::IdentityNotFound(_)));
}

#[tokio::test]
async fn put_contact_requires_the_identity() {
  let m = manager().await;
  let err = m
    .put_contact(&admin(), Uuid::new_v4(), some_contact())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::IdentityNotFound(_)));
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_both_records() {
  let m = manager().await;
  let root = admin();
  let mut new = new_account("Jane", "Doe", "jane@example.com");
  new.contact = Some(some_contact());
  let target = m.create_account(&root, new).await.unwrap().identity;

  m.delete_account(&root, target.identity_id).await.unwrap();

  let err = m.get_account(&root, target.identity_id).await.unwrap_err();
  assert!(matches!(err, Error::IdentityNotFound(_)));
  assert!(
    m.store()
      .get_contact(target.identity_id)
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn delete_of_missing_account_is_not_found() {
  let m = manager().await;
  let err = m.delete_account(&admin(), Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::IdentityNotFound(_)));
}

#[tokio::test]
async fn unauthorized_probes_cannot_distinguish_missing_accounts() {
  let m = manager().await;
  let actor = base_actor(Uuid::new_v4());

  // Denied before the lookup: Forbidden, never NotFound, for ids the
  // actor has no business touching.
  let update =
    AccountUpdate { email: Some("x@example.com".into()), ..Default::default() };
  let err = m
    .update_account(&actor, Uuid::new_v4(), update)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));

  let err = m.delete_account(&actor, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn hr_manager_cannot_delete_admins() {
  let m = manager().await;
  let mut new = new_account("Amy", "Admin", "amy@example.com");
  new.roles = RoleSet::new([Role::Admin]);
  let target = m.create_account(&admin(), new).await.unwrap().identity;

  let err = m
    .delete_account(&hr_manager(), target.identity_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

// ─── Partial writes ──────────────────────────────────────────────────────────

/// Delegates to a real store but refuses every contact write — the failure
/// mode that leaves an identity without its contact half.
struct ContactlessStore {
  inner: SqliteStore,
}

impl DirectoryStore for ContactlessStore {
  type Error = crate::Error;

  async fn create_identity(
    &self,
    input: NewIdentity,
  ) -> Result<Identity, Self::Error> {
    self.inner.create_identity(input).await
  }

  async fn get_identity(&self, id: Uuid) -> Result<Option<Identity>, Self::Error> {
    self.inner.get_identity(id).await
  }

  async fn update_identity(
    &self,
    id: Uuid,
    patch: IdentityPatch,
  ) -> Result<bool, Self::Error> {
    self.inner.update_identity(id, patch).await
  }

  async fn delete_identity(&self, id: Uuid) -> Result<bool, Self::Error> {
    self.inner.delete_identity(id).await
  }

  async fn handles_with_prefix(
    &self,
    prefix: &str,
  ) -> Result<Vec<String>, Self::Error> {
    self.inner.handles_with_prefix(prefix).await
  }

  async fn list_identities(
    &self,
    query: &PageQuery,
  ) -> Result<Vec<Identity>, Self::Error> {
    self.inner.list_identities(query).await
  }

  async fn count_identities(
    &self,
    search: Option<&str>,
  ) -> Result<u64, Self::Error> {
    self.inner.count_identities(search).await
  }

  async fn role_sets(&self) -> Result<Vec<RoleSet>, Self::Error> {
    self.inner.role_sets().await
  }

  async fn get_contact(
    &self,
    owner_id: Uuid,
  ) -> Result<Option<ContactDetails>, Self::Error> {
    self.inner.get_contact(owner_id).await
  }

  async fn put_contact(&self, _details: ContactDetails) -> Result<(), Self::Error> {
    Err(tokio_rusqlite::Error::ConnectionClosed.into())
  }

  async fn delete_contact(&self, owner_id: Uuid) -> Result<bool, Self::Error> {
    self.inner.delete_contact(owner_id).await
  }

  fn classify_conflict(err: &Self::Error) -> Option<Conflict> {
    SqliteStore::classify_conflict(err)
  }
}

#[tokio::test]
async fn contact_write_failure_surfaces_as_partial_write() {
  let inner = SqliteStore::open_in_memory().await.unwrap();
  let store = Arc::new(ContactlessStore { inner });
  let m = AccountManager::new(Arc::clone(&store));

  let mut new = new_account("Jane", "Doe", "jane@example.com");
  new.contact = Some(some_contact());

  let err = m.create_account(&admin(), new).await.unwrap_err();
  let id = match err {
    Error::PartialWrite { id, .. } => id,
    other => panic!("expected a partial write, got {other:?}"),
  };

  // The identity stands; only the contact half is missing.
  let kept = store.get_identity(id).await.unwrap().expect("identity kept");
  assert_eq!(kept.handle, "jane.doe");
  assert!(store.inner.get_contact(id).await.unwrap().is_none());
}

// ─── Hooks ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingHook {
  events: Mutex<Vec<String>>,
}

impl AuthHook for RecordingHook {
  fn account_created(&self, identity: &Identity) {
    self
      .events
      .lock()
      .unwrap()
      .push(format!("created {}", identity.handle));
  }

  fn roles_changed(&self, _id: Uuid, roles: &RoleSet) {
    self
      .events
      .lock()
      .unwrap()
      .push(format!("roles {}", roles.to_joined()));
  }

  fn account_deleted(&self, _id: Uuid) {
    self.events.lock().unwrap().push("deleted".to_string());
  }
}

#[tokio::test]
async fn hook_observes_the_account_lifecycle() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let hook = Arc::new(RecordingHook::default());
  let m = AccountManager::with_hook(Arc::new(store), hook.clone());
  let root = admin();

  let target = m
    .create_account(&root, new_account("Jane", "Doe", "jane@example.com"))
    .await
    .unwrap()
    .identity;
  let update = AccountUpdate {
    roles: Some(RoleSet::new([Role::HrManager, Role::User])),
    ..Default::default()
  };
  m.update_account(&root, target.identity_id, update)
    .await
    .unwrap();
  m.delete_account(&root, target.identity_id).await.unwrap();

  let events = hook.events.lock().unwrap();
  assert_eq!(
    *events,
    vec![
      "created jane.doe".to_string(),
      "roles hr-manager,user".to_string(),
      "deleted".to_string(),
    ]
  );
}

#[tokio::test]
async fn hook_is_silent_when_authorization_fails() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let hook = Arc::new(RecordingHook::default());
  let m = AccountManager::with_hook(Arc::new(store), hook.clone());

  let _ = m
    .create_account(
      &base_actor(Uuid::new_v4()),
      new_account("Jane", "Doe", "jane@example.com"),
    )
    .await;
  assert!(hook.events.lock().unwrap().is_empty());
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn directory_pages_and_counts() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let m = AccountManager::new(Arc::clone(&store));
  let d = Directory::new(store);
  let root = admin();

  for (first, email) in [
    ("Jane", "jane@example.com"),
    ("John", "john@example.com"),
    ("June", "june@example.com"),
  ] {
    m.create_account(&root, new_account(first, "Doe", email))
      .await
      .unwrap();
  }

  let page = d
    .list(&root, &PageQuery { offset: 1, limit: Some(1), search: None })
    .await
    .unwrap();
  assert_eq!(page.total, 3);
  assert_eq!(page.items.len(), 1);
  assert_eq!(page.items[0].handle, "john.doe");

  // Filtered listings report the filtered population.
  let page = d
    .list(
      &root,
      &PageQuery { offset: 0, limit: None, search: Some("june".into()) },
    )
    .await
    .unwrap();
  assert_eq!(page.total, 1);
}

#[tokio::test]
async fn directory_denies_base_role() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let d = Directory::new(store);

  let err = d
    .list(&base_actor(Uuid::new_v4()), &PageQuery::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn stats_count_every_role_membership() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let m = AccountManager::new(Arc::clone(&store));
  let d = Directory::new(store);
  let root = admin();

  let mut multi = new_account("Helen", "Rivers", "helen@example.com");
  multi.roles = RoleSet::new([Role::HrManager, Role::User]);
  m.create_account(&root, multi).await.unwrap();
  m.create_account(&root, new_account("Jane", "Doe", "jane@example.com"))
    .await
    .unwrap();

  let stats = d.stats(&root).await.unwrap();
  assert_eq!(stats.total, 2);
  assert_eq!(stats.by_role[&Role::User], 2);
  assert_eq!(stats.by_role[&Role::HrManager], 1);
  assert_eq!(stats.by_role[&Role::Admin], 0);
}

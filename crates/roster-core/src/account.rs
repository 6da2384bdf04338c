//! The account record manager — the only write path for the
//! (identity, contact details) pair.
//!
//! Every mutating operation validates its input, authorizes the actor
//! against the role policy, and only then touches the store. The identity
//! write and the contact write are one logical unit targeting the same key,
//! but the store is not assumed to span them with a transaction: a contact
//! failure after a successful identity write surfaces as
//! [`Error::PartialWrite`], and the orphaned identity is a valid,
//! retry-from state rather than something to roll back.

use std::{collections::HashSet, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  contact::{ContactDetails, ContactFields},
  handle::{base_candidate, is_variant, next_available},
  hook::{AuthHook, NoopHook},
  identity::{Identity, IdentityPatch, NewIdentity},
  policy::{Action, Actor, authorize},
  role::RoleSet,
  store::{Conflict, DirectoryStore},
};

/// How many follow-up handle candidates the create path will claim before
/// giving up. Each retry only happens when a concurrent create wins the
/// race between the prefix scan and the insert.
const HANDLE_CLAIM_ATTEMPTS: usize = 4;

// ─── Inputs and outputs ──────────────────────────────────────────────────────

/// A person's name fields, as submitted by the console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonName {
  pub first_name: String,
  pub surname:    String,
}

/// Input to [`AccountManager::create_account`].
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub name:    PersonName,
  pub email:   String,
  pub roles:   RoleSet,
  pub contact: Option<ContactFields>,
}

/// A partial update to an account. `None` leaves the identity field alone;
/// a present `contact` replaces the whole contact record.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
  pub name:    Option<PersonName>,
  pub email:   Option<String>,
  pub roles:   Option<RoleSet>,
  pub contact: Option<ContactFields>,
}

/// The merged read model: an identity plus its contact record, which is
/// legitimately absent.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
  pub identity: Identity,
  pub contact:  Option<ContactDetails>,
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Owns the lifecycle of the (identity, contact details) pair.
pub struct AccountManager<S> {
  store: Arc<S>,
  hook:  Arc<dyn AuthHook>,
}

impl<S> Clone for AccountManager<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), hook: Arc::clone(&self.hook) }
  }
}

impl<S: DirectoryStore> AccountManager<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, hook: Arc::new(NoopHook) }
  }

  /// Attach an auth-provider hook notified after successful mutations.
  pub fn with_hook(store: Arc<S>, hook: Arc<dyn AuthHook>) -> Self {
    Self { store, hook }
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  // ── Username resolution ───────────────────────────────────────────────

  /// Resolve `base` against the handles currently in the store: return it
  /// unchanged when free, otherwise the first free numbered variant.
  ///
  /// This is a check-then-act scan, not a lock; the store's uniqueness
  /// constraint backstops it and [`Self::create_account`] retries on a
  /// lost race.
  pub async fn resolve_handle(&self, base: &str) -> Result<String> {
    if base.trim().is_empty() {
      return Err(Error::Validation("base username is required".into()));
    }
    let existing: HashSet<String> = self
      .store
      .handles_with_prefix(base)
      .await
      .map_err(store_err::<S>)?
      .into_iter()
      .collect();
    Ok(next_available(base, &existing))
  }

  // ── Create ────────────────────────────────────────────────────────────

  /// Create the identity and its contact record as one logical unit.
  pub async fn create_account(
    &self,
    actor: &Actor,
    new: NewAccount,
  ) -> Result<Account> {
    let NewAccount { name, email, roles, contact } = new;

    validate_name(&name)?;
    if email.trim().is_empty() {
      return Err(Error::Validation("email is required".into()));
    }
    authorize(actor, &Action::CreateAccount { target: roles.clone() })?;

    let base = base_candidate(&name.first_name, &name.surname);
    let identity = self.claim_identity(&base, &email, &roles).await?;
    self.hook.account_created(&identity);

    let contact = match contact {
      None => None,
      Some(fields) => {
        let details = fields.into_details(identity.identity_id);
        if let Err(e) = self.store.put_contact(details.clone()).await {
          // The identity stands; the caller retries the contact write.
          return Err(Error::PartialWrite {
            id:     identity.identity_id,
            source: Box::new(e),
          });
        }
        Some(details)
      }
    };

    Ok(Account { identity, contact })
  }

  /// Resolve a handle and insert, retrying with the next candidate when a
  /// concurrent create claims the same handle first.
  async fn claim_identity(
    &self,
    base: &str,
    email: &str,
    roles: &RoleSet,
  ) -> Result<Identity> {
    for _ in 0..HANDLE_CLAIM_ATTEMPTS {
      let handle = self.resolve_handle(base).await?;
      let input = NewIdentity {
        handle: handle.clone(),
        email:  email.to_owned(),
        roles:  roles.clone(),
      };
      match self.store.create_identity(input).await {
        Ok(identity) => return Ok(identity),
        Err(e) => match S::classify_conflict(&e) {
          Some(Conflict::Handle) => continue,
          Some(Conflict::Email) => {
            return Err(Error::EmailTaken(email.to_owned()));
          }
          None => return Err(Error::Store(Box::new(e))),
        },
      }
    }
    Err(Error::HandleTaken(base.to_owned()))
  }

  // ── Read ──────────────────────────────────────────────────────────────

  /// Read-only join of the identity and its contact record. An absent
  /// contact record is `None`, never an error.
  pub async fn get_account(&self, actor: &Actor, id: Uuid) -> Result<Account> {
    authorize(actor, &Action::ReadAccount { target: id })?;
    let identity = self.require_identity(id).await?;
    let contact =
      self.store.get_contact(id).await.map_err(store_err::<S>)?;
    Ok(Account { identity, contact })
  }

  /// Fetch just the contact record. `None` means "no contact info yet".
  pub async fn get_contact(
    &self,
    actor: &Actor,
    id: Uuid,
  ) -> Result<Option<ContactDetails>> {
    authorize(actor, &Action::ReadAccount { target: id })?;
    self.require_identity(id).await?;
    self.store.get_contact(id).await.map_err(store_err::<S>)
  }

  // ── Update ────────────────────────────────────────────────────────────

  /// Apply a partial identity update and, when supplied, a full contact
  /// replacement.
  ///
  /// Role changes are authorized against the union of the old and new role
  /// sets, so a partial-set submission can neither grant nor strip a role
  /// the actor could not assign outright. The contact write replaces the
  /// whole record — fields omitted by the caller come back cleared.
  pub async fn update_account(
    &self,
    actor: &Actor,
    id: Uuid,
    update: AccountUpdate,
  ) -> Result<()> {
    let AccountUpdate { name, email, roles, contact } = update;

    // Validate and authorize everything that does not need the stored
    // record, before it is fetched: an actor who would be denied anyway
    // learns nothing about whether the account exists.
    if let Some(roles) = &roles {
      authorize(actor, &Action::AssignRoles { target: roles.clone() })?;
    }
    if let Some(email) = &email {
      if email.trim().is_empty() {
        return Err(Error::Validation("email is required".into()));
      }
      authorize(actor, &Action::UpdateEmail { target: id })?;
    }
    if let Some(name) = &name {
      authorize(actor, &Action::Rename { target: id })?;
      validate_name(name)?;
    }
    if contact.is_some() {
      authorize(actor, &Action::UpdateContact { target: id })?;
    }

    let existing = self.require_identity(id).await?;
    let mut patch = IdentityPatch::default();

    if let Some(roles) = roles {
      // The union of old and new is what the change actually touches.
      let union = existing.roles.union(&roles);
      authorize(actor, &Action::AssignRoles { target: union })?;
      patch.roles = Some(roles);
    }

    patch.email = email;

    if let Some(name) = name {
      let base = base_candidate(&name.first_name, &name.surname);
      // Unchanged name keeps the current handle, numbered suffix and all.
      if !is_variant(&existing.handle, &base) {
        patch.handle = Some(self.resolve_handle(&base).await?);
      }
    }

    if !patch.is_empty() {
      let roles_changed = patch.roles.clone();
      match self.store.update_identity(id, patch).await {
        Ok(true) => {}
        Ok(false) => return Err(Error::IdentityNotFound(id)),
        Err(e) => return Err(classify::<S>(e, &existing)),
      }
      if let Some(roles) = roles_changed {
        self.hook.roles_changed(id, &roles);
      }
    }

    if let Some(fields) = contact {
      self
        .store
        .put_contact(fields.into_details(id))
        .await
        .map_err(store_err::<S>)?;
    }

    Ok(())
  }

  /// Replace the contact record on its own — the self-service profile path.
  pub async fn put_contact(
    &self,
    actor: &Actor,
    id: Uuid,
    fields: ContactFields,
  ) -> Result<()> {
    authorize(actor, &Action::UpdateContact { target: id })?;
    self.require_identity(id).await?;
    self
      .store
      .put_contact(fields.into_details(id))
      .await
      .map_err(store_err::<S>)
  }

  // ── Delete ────────────────────────────────────────────────────────────

  /// Delete the identity and its contact record. Either failing makes the
  /// whole operation fail — there is no silent partial delete.
  pub async fn delete_account(&self, actor: &Actor, id: Uuid) -> Result<()> {
    // An actor who may delete nobody is denied before the lookup reveals
    // whether the account exists. The base-role set is the weakest target.
    authorize(actor, &Action::DeleteAccount { target: RoleSet::default() })?;
    let existing = self.require_identity(id).await?;
    authorize(actor, &Action::DeleteAccount { target: existing.roles.clone() })?;

    // Contact first: if the identity delete then fails, a contact-less
    // identity is still a valid state to retry from. An absent contact
    // record deletes to `false`, which is fine.
    self.store.delete_contact(id).await.map_err(store_err::<S>)?;
    if !self.store.delete_identity(id).await.map_err(store_err::<S>)? {
      return Err(Error::IdentityNotFound(id));
    }
    self.hook.account_deleted(id);
    Ok(())
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  async fn require_identity(&self, id: Uuid) -> Result<Identity> {
    self
      .store
      .get_identity(id)
      .await
      .map_err(store_err::<S>)?
      .ok_or(Error::IdentityNotFound(id))
  }
}

fn validate_name(name: &PersonName) -> Result<()> {
  if name.first_name.trim().is_empty() || name.surname.trim().is_empty() {
    return Err(Error::Validation("first name and surname are required".into()));
  }
  Ok(())
}

fn store_err<S: DirectoryStore>(e: S::Error) -> Error {
  Error::Store(Box::new(e))
}

fn classify<S: DirectoryStore>(e: S::Error, existing: &Identity) -> Error {
  match S::classify_conflict(&e) {
    Some(Conflict::Handle) => Error::HandleTaken(existing.handle.clone()),
    Some(Conflict::Email) => Error::EmailTaken(existing.email.clone()),
    None => Error::Store(Box::new(e)),
  }
}

//! [`SqliteStore`] — the SQLite implementation of [`DirectoryStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use roster_core::{
  contact::ContactDetails,
  identity::{Identity, IdentityPatch, NewIdentity},
  role::RoleSet,
  store::{Conflict, DirectoryStore, PageQuery},
};

use crate::{
  Error, Result,
  encode::{RawContact, RawIdentity, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster directory store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Which UNIQUE constraint of the `identities` table an error names, if any.
fn unique_violation(e: &tokio_rusqlite::Error) -> Option<Conflict> {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    failure,
    Some(msg),
  )) = e
    && failure.code == rusqlite::ErrorCode::ConstraintViolation
  {
    if msg.contains("identities.handle") {
      return Some(Conflict::Handle);
    }
    if msg.contains("identities.email") {
      return Some(Conflict::Email);
    }
  }
  None
}

// ─── DirectoryStore impl ─────────────────────────────────────────────────────

impl DirectoryStore for SqliteStore {
  type Error = Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn create_identity(&self, input: NewIdentity) -> Result<Identity> {
    let identity = Identity {
      identity_id: Uuid::new_v4(),
      handle:      input.handle,
      email:       input.email,
      roles:       input.roles,
      created_at:  Utc::now(),
    };

    let id_str     = encode_uuid(identity.identity_id);
    let handle     = identity.handle.clone();
    let email      = identity.email.clone();
    let roles_str  = identity.roles.to_joined();
    let at_str     = encode_dt(identity.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO identities (identity_id, handle, email, roles, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, handle, email, roles_str, at_str],
        )?;
        Ok(())
      })
      .await;

    match inserted {
      Ok(()) => Ok(identity),
      Err(e) => match unique_violation(&e) {
        Some(Conflict::Handle) => Err(Error::HandleConflict(identity.handle)),
        Some(Conflict::Email) => Err(Error::EmailConflict(identity.email)),
        None => Err(e.into()),
      },
    }
  }

  async fn get_identity(&self, id: Uuid) -> Result<Option<Identity>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT identity_id, handle, email, roles, created_at
               FROM identities WHERE identity_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawIdentity {
                  identity_id: row.get(0)?,
                  handle:      row.get(1)?,
                  email:       row.get(2)?,
                  roles:       row.get(3)?,
                  created_at:  row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIdentity::into_identity).transpose()
  }

  async fn update_identity(&self, id: Uuid, patch: IdentityPatch) -> Result<bool> {
    let id_str    = encode_uuid(id);
    let handle    = patch.handle.clone();
    let email     = patch.email.clone();
    let roles_str = patch.roles.as_ref().map(RoleSet::to_joined);

    let updated = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE identities SET
             handle = COALESCE(?1, handle),
             email  = COALESCE(?2, email),
             roles  = COALESCE(?3, roles)
           WHERE identity_id = ?4",
          rusqlite::params![handle, email, roles_str, id_str],
        )?;
        Ok(n > 0)
      })
      .await;

    match updated {
      Ok(found) => Ok(found),
      Err(e) => match unique_violation(&e) {
        Some(Conflict::Handle) => {
          Err(Error::HandleConflict(patch.handle.unwrap_or_default()))
        }
        Some(Conflict::Email) => {
          Err(Error::EmailConflict(patch.email.unwrap_or_default()))
        }
        None => Err(e.into()),
      },
    }
  }

  async fn delete_identity(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM identities WHERE identity_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  // ── Secondary lookups ─────────────────────────────────────────────────────

  async fn handles_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
    let pattern = format!("{prefix}%");
    let handles = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT handle FROM identities WHERE handle LIKE ?1")?;
        let rows = stmt
          .query_map(rusqlite::params![pattern], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(handles)
  }

  async fn list_identities(&self, query: &PageQuery) -> Result<Vec<Identity>> {
    let pattern    = query.search.as_deref().map(|t| format!("%{t}%"));
    let limit_val  = query.limit.map(|l| l as i64).unwrap_or(-1);
    let offset_val = query.offset as i64;

    let raws: Vec<RawIdentity> = self
      .conn
      .call(move |conn| {
        let where_clause = if pattern.is_some() {
          "WHERE handle LIKE ?1 OR email LIKE ?1"
        } else {
          ""
        };

        // rowid order is insertion order; offset/limit over it gives the
        // stable page windows the dashboard expects.
        let sql = format!(
          "SELECT identity_id, handle, email, roles, created_at
           FROM identities
           {where_clause}
           ORDER BY rowid
           LIMIT ?2 OFFSET ?3"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![pattern.as_deref(), limit_val, offset_val],
            |row| {
              Ok(RawIdentity {
                identity_id: row.get(0)?,
                handle:      row.get(1)?,
                email:       row.get(2)?,
                roles:       row.get(3)?,
                created_at:  row.get(4)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIdentity::into_identity).collect()
  }

  async fn count_identities(&self, search: Option<&str>) -> Result<u64> {
    let pattern = search.map(|t| format!("%{t}%"));
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(match pattern {
          Some(p) => conn.query_row(
            "SELECT COUNT(*) FROM identities
             WHERE handle LIKE ?1 OR email LIKE ?1",
            rusqlite::params![p],
            |r| r.get(0),
          )?,
          None => conn.query_row(
            "SELECT COUNT(*) FROM identities",
            [],
            |r| r.get(0),
          )?,
        })
      })
      .await?;
    Ok(n as u64)
  }

  async fn role_sets(&self) -> Result<Vec<RoleSet>> {
    let joined: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT roles FROM identities")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(joined.iter().map(|s| RoleSet::from_joined(s)).collect())
  }

  // ── Contact details ───────────────────────────────────────────────────────

  async fn get_contact(&self, owner_id: Uuid) -> Result<Option<ContactDetails>> {
    let id_str = encode_uuid(owner_id);

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT owner_id, address_line1, address_line2, city, postcode, country
               FROM contact_details WHERE owner_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawContact {
                  owner_id:      row.get(0)?,
                  address_line1: row.get(1)?,
                  address_line2: row.get(2)?,
                  city:          row.get(3)?,
                  postcode:      row.get(4)?,
                  country:       row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContact::into_details).transpose()
  }

  async fn put_contact(&self, details: ContactDetails) -> Result<()> {
    let id_str = encode_uuid(details.owner_id);
    // One statement, so the replace is atomic: no observable window with
    // zero or duplicate contact rows.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO contact_details
             (owner_id, address_line1, address_line2, city, postcode, country)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            details.address_line1,
            details.address_line2,
            details.city,
            details.postcode,
            details.country,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_contact(&self, owner_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(owner_id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM contact_details WHERE owner_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  // ── Error classification ──────────────────────────────────────────────────

  fn classify_conflict(err: &Error) -> Option<Conflict> {
    match err {
      Error::HandleConflict(_) => Some(Conflict::Handle),
      Error::EmailConflict(_) => Some(Conflict::Email),
      _ => None,
    }
  }
}

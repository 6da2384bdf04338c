//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, and role sets in their ordered comma-joined form. The joined
//! form exists only on this edge; everything above the store works with
//! [`RoleSet`].

use chrono::{DateTime, Utc};
use roster_core::{contact::ContactDetails, identity::Identity, role::RoleSet};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `identities` row.
pub struct RawIdentity {
  pub identity_id: String,
  pub handle:      String,
  pub email:       String,
  pub roles:       String,
  pub created_at:  String,
}

impl RawIdentity {
  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      identity_id: decode_uuid(&self.identity_id)?,
      handle:      self.handle,
      email:       self.email,
      roles:       RoleSet::from_joined(&self.roles),
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `contact_details` row.
pub struct RawContact {
  pub owner_id:      String,
  pub address_line1: Option<String>,
  pub address_line2: Option<String>,
  pub city:          Option<String>,
  pub postcode:      Option<String>,
  pub country:       Option<String>,
}

impl RawContact {
  pub fn into_details(self) -> Result<ContactDetails> {
    Ok(ContactDetails {
      owner_id:      decode_uuid(&self.owner_id)?,
      address_line1: self.address_line1,
      address_line2: self.address_line2,
      city:          self.city,
      postcode:      self.postcode,
      country:       self.country,
    })
  }
}

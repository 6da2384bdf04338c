//! Contact details — the mutable postal sub-record linked one-to-one to an
//! identity.
//!
//! Absence is a valid state ("no contact info yet"), distinct from any
//! error. Writes are full replacements: the caller resubmits every field,
//! and whatever is omitted comes back cleared. That sharp edge is part of
//! the contract, not an accident of the storage layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The stored contact record for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
  pub owner_id:      Uuid,
  pub address_line1: Option<String>,
  pub address_line2: Option<String>,
  pub city:          Option<String>,
  pub postcode:      Option<String>,
  pub country:       Option<String>,
}

/// Caller-supplied contact fields, before they are bound to an owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
  pub address_line1: Option<String>,
  pub address_line2: Option<String>,
  pub city:          Option<String>,
  pub postcode:      Option<String>,
  pub country:       Option<String>,
}

impl ContactFields {
  /// Bind these fields to an identity, producing the record the store keeps.
  pub fn into_details(self, owner_id: Uuid) -> ContactDetails {
    ContactDetails {
      owner_id,
      address_line1: self.address_line1,
      address_line2: self.address_line2,
      city:          self.city,
      postcode:      self.postcode,
      country:       self.country,
    }
  }
}

//! Handlers for `/accounts/{id}/contact`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/accounts/:id/contact` | `{"contact": null}` when absent |
//! | `PUT`  | `/accounts/:id/contact` | Full replace; omitted fields clear |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use roster_core::{
  contact::{ContactDetails, ContactFields},
  store::DirectoryStore,
};

use crate::{AppState, auth::AuthedActor, error::ApiError};

// ─── Wire shape ──────────────────────────────────────────────────────────────

/// Contact fields as they appear on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDto {
  pub address_line1: Option<String>,
  pub address_line2: Option<String>,
  pub city:          Option<String>,
  pub postcode:      Option<String>,
  pub country:       Option<String>,
}

impl From<ContactDetails> for ContactDto {
  fn from(d: ContactDetails) -> Self {
    Self {
      address_line1: d.address_line1,
      address_line2: d.address_line2,
      city:          d.city,
      postcode:      d.postcode,
      country:       d.country,
    }
  }
}

impl ContactDto {
  pub fn into_fields(self) -> ContactFields {
    ContactFields {
      address_line1: self.address_line1,
      address_line2: self.address_line2,
      city:          self.city,
      postcode:      self.postcode,
      country:       self.country,
    }
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /accounts/:id/contact`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: DirectoryStore + Send + Sync + 'static,
{
  let contact = state.manager.get_contact(&actor, id).await?;
  Ok(Json(json!({ "contact": contact.map(ContactDto::from) })))
}

/// `PUT /accounts/:id/contact` — the self-service profile write.
pub async fn put_one<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(id): Path<Uuid>,
  Json(body): Json<ContactDto>,
) -> Result<Json<Value>, ApiError>
where
  S: DirectoryStore + Send + Sync + 'static,
{
  state.manager.put_contact(&actor, id, body.into_fields()).await?;
  Ok(Json(json!({ "success": true })))
}

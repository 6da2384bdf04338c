//! Handlers for `/accounts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/accounts` | 201 with the merged `{user, contact}` record |
//! | `GET`    | `/accounts/:id` | `contact` is `null` when absent |
//! | `PATCH`  | `/accounts/:id` | Identity patch + full contact replace |
//! | `DELETE` | `/accounts/:id` | Removes identity and contact together |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use roster_core::{
  account::{Account, AccountUpdate, NewAccount, PersonName},
  contact::ContactFields,
  identity::Identity,
  role::{Role, RoleSet},
  store::DirectoryStore,
};

use crate::{
  AppState, auth::AuthedActor, contact::ContactDto, error::ApiError,
};

// ─── Wire shapes ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDto {
  pub id:         Uuid,
  pub username:   String,
  pub email:      String,
  pub roles:      RoleSet,
  pub created_at: DateTime<Utc>,
}

impl From<Identity> for IdentityDto {
  fn from(i: Identity) -> Self {
    Self {
      id:         i.identity_id,
      username:   i.handle,
      email:      i.email,
      roles:      i.roles,
      created_at: i.created_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct AccountDto {
  pub user:    IdentityDto,
  pub contact: Option<ContactDto>,
}

impl From<Account> for AccountDto {
  fn from(a: Account) -> Self {
    Self {
      user:    a.identity.into(),
      contact: a.contact.map(ContactDto::from),
    }
  }
}

/// Body for `POST /accounts`. Contact fields ride flat alongside the
/// identity fields, as the console's add-user form submits them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub first_name:    String,
  pub surname:       String,
  pub email:         String,
  #[serde(default)]
  pub roles:         Option<Vec<Role>>,
  pub address_line1: Option<String>,
  pub address_line2: Option<String>,
  pub city:          Option<String>,
  pub postcode:      Option<String>,
  pub country:       Option<String>,
}

/// Body for `PATCH /accounts/:id`. Absent identity fields are untouched;
/// presence of any contact field triggers a full contact replace.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub first_name:    Option<String>,
  pub surname:       Option<String>,
  pub email:         Option<String>,
  pub roles:         Option<Vec<Role>>,
  pub address_line1: Option<String>,
  pub address_line2: Option<String>,
  pub city:          Option<String>,
  pub postcode:      Option<String>,
  pub country:       Option<String>,
}

fn contact_fields(
  address_line1: Option<String>,
  address_line2: Option<String>,
  city: Option<String>,
  postcode: Option<String>,
  country: Option<String>,
) -> Option<ContactFields> {
  if address_line1.is_none()
    && address_line2.is_none()
    && city.is_none()
    && postcode.is_none()
    && country.is_none()
  {
    return None;
  }
  Some(ContactFields { address_line1, address_line2, city, postcode, country })
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /accounts`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore + Send + Sync + 'static,
{
  let new = NewAccount {
    name:    PersonName {
      first_name: body.first_name,
      surname:    body.surname,
    },
    email:   body.email,
    roles:   body.roles.map(RoleSet::new).unwrap_or_default(),
    contact: contact_fields(
      body.address_line1,
      body.address_line2,
      body.city,
      body.postcode,
      body.country,
    ),
  };

  let account = state.manager.create_account(&actor, new).await?;
  tracing::info!(handle = %account.identity.handle, "account created");
  Ok((StatusCode::CREATED, Json(AccountDto::from(account))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /accounts/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(id): Path<Uuid>,
) -> Result<Json<AccountDto>, ApiError>
where
  S: DirectoryStore + Send + Sync + 'static,
{
  let account = state.manager.get_account(&actor, id).await?;
  Ok(Json(account.into()))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /accounts/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: DirectoryStore + Send + Sync + 'static,
{
  let name = match (body.first_name, body.surname) {
    (Some(first_name), Some(surname)) => {
      Some(PersonName { first_name, surname })
    }
    (None, None) => None,
    _ => {
      return Err(ApiError::BadRequest(
        "firstName and surname must be supplied together".into(),
      ));
    }
  };

  let update = AccountUpdate {
    name,
    email: body.email,
    roles: body.roles.map(RoleSet::new),
    contact: contact_fields(
      body.address_line1,
      body.address_line2,
      body.city,
      body.postcode,
      body.country,
    ),
  };

  state.manager.update_account(&actor, id, update).await?;
  tracing::info!(%id, "account updated");
  Ok(Json(json!({ "success": true })))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /accounts/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  AuthedActor(actor): AuthedActor,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: DirectoryStore + Send + Sync + 'static,
{
  state.manager.delete_account(&actor, id).await?;
  tracing::info!(%id, "account deleted");
  Ok(Json(json!({ "success": true })))
}

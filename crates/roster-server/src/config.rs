//! TOML / environment configuration for the server binary.

use std::path::PathBuf;

use roster_api::auth::Principal;
use roster_core::role::{Role, RoleSet};
use serde::Deserialize;
use uuid::Uuid;

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  8700
}

fn default_store_path() -> PathBuf {
  PathBuf::from("~/.local/share/roster/roster.db")
}

/// One `[[principals]]` table in config.toml.
#[derive(Clone, Debug, Deserialize)]
pub struct PrincipalConfig {
  pub username:      String,
  /// argon2 PHC string (generate with `roster-server --hash-password`).
  pub password_hash: String,
  /// Identity this principal acts as.
  pub identity_id:   Uuid,
  /// Roles assumed before the identity row exists.
  #[serde(default)]
  pub roles:         Vec<Role>,
}

impl From<PrincipalConfig> for Principal {
  fn from(cfg: PrincipalConfig) -> Self {
    Principal {
      username:      cfg.username,
      password_hash: cfg.password_hash,
      identity_id:   cfg.identity_id,
      roles:         RoleSet::new(cfg.roles),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub principals: Vec<PrincipalConfig>,
}

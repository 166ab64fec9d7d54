// foodnest/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

/// Closed set of marketplace roles. Permission checks go through the table in
/// `crate::permissions` rather than comparing against these variants directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Wholesaler,
  Retailer,
  Dispatch,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub first_name: Option<String>,
  pub middle_name: Option<String>,
  pub last_name: Option<String>,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub role: Role,
  pub is_active: bool,
  pub last_login: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

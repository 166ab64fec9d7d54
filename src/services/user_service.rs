// foodnest/src/services/user_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::User;

pub const USER_COLUMNS: &str = "id, email, password_hash, first_name, middle_name, last_name, phone, address, \
                                role, is_active, last_login, created_at, updated_at";

/// Loads the full record of the authenticated caller. The token only carries
/// the user id; role and activity status always come fresh from the store.
pub async fn request_user(db_pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
  let user: Option<User> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;
  user.ok_or_else(|| AppError::Auth("Authenticated user no longer exists.".to_string()))
}

pub async fn user_by_id(db_pool: &PgPool, user_id: Uuid) -> Result<Option<User>, AppError> {
  let user: Option<User> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;
  Ok(user)
}

pub async fn user_by_email(db_pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
  let user: Option<User> = sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
    .bind(email)
    .fetch_optional(db_pool)
    .await?;
  Ok(user)
}

// foodnest/src/web/handlers/account_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Role, User};
use crate::pagination::paginate;
use crate::permissions::Permission;
use crate::services::user_service::{self, USER_COLUMNS};
use crate::services::auth_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::PageQuery;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct RegisterPayload {
  pub email: String,
  pub password: String,
  pub first_name: Option<String>,
  pub middle_name: Option<String>,
  pub last_name: Option<String>,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub role: Option<Role>, // defaults to retailer
}

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateUserPayload {
  pub first_name: Option<String>,
  pub middle_name: Option<String>,
  pub last_name: Option<String>,
  pub phone: Option<String>,
  pub address: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateRolePayload {
  pub role: Role,
}

fn token_response(user: &User, app_state: &AppState) -> Result<serde_json::Value, AppError> {
  Ok(json!({
      "id": user.id,
      "email": user.email,
      "access_token": auth_service::issue_access_token(user.id, &app_state.config)?,
      "refresh_token": auth_service::issue_refresh_token(user.id, &app_state.config)?,
  }))
}

// --- Handler Implementations ---

#[instrument(name = "handler::register", skip(app_state, payload), fields(req_email = %payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  info!("Registration attempt for email: {}", payload.email);

  if payload.password.len() < 8 {
    return Err(AppError::Validation(
      "Password must be at least 8 characters long.".to_string(),
    ));
  }

  if user_service::user_by_email(&app_state.db_pool, &payload.email)
    .await?
    .is_some()
  {
    warn!("Registration rejected: email {} already registered.", payload.email);
    return Err(AppError::Conflict("Email already registered.".to_string()));
  }

  let password_hash = auth_service::hash_password(&payload.password)?;
  let role = payload.role.unwrap_or(Role::Retailer);
  let now = Utc::now();

  let user: User = sqlx::query_as(&format!(
    "INSERT INTO users (id, email, password_hash, first_name, middle_name, last_name, phone, address, role, is_active, created_at, updated_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10, $10) \
     RETURNING {}",
    USER_COLUMNS
  ))
  .bind(Uuid::new_v4())
  .bind(&payload.email)
  .bind(&password_hash)
  .bind(&payload.first_name)
  .bind(&payload.middle_name)
  .bind(&payload.last_name)
  .bind(&payload.phone)
  .bind(&payload.address)
  .bind(role)
  .bind(now)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!("User registered successfully: {}", user.id);
  Ok(HttpResponse::Created().json(token_response(&user, &app_state)?))
}

#[instrument(name = "handler::login", skip(app_state, payload), fields(req_email = %payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
  info!("Login attempt for email: {}", payload.email);

  let user = user_service::user_by_email(&app_state.db_pool, &payload.email)
    .await?
    .ok_or_else(|| AppError::Auth("Invalid credentials.".to_string()))?;

  if !auth_service::verify_password(&user.password_hash, &payload.password)? {
    warn!("Login failed for email {}: password mismatch.", payload.email);
    return Err(AppError::Auth("Invalid credentials.".to_string()));
  }

  sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
    .bind(Utc::now())
    .bind(user.id)
    .execute(&app_state.db_pool)
    .await?;

  info!("Login successful for user: {}", user.id);
  Ok(HttpResponse::Created().json(token_response(&user, &app_state)?))
}

#[instrument(name = "handler::get_user", skip(app_state, auth_user, path), fields(caller = %auth_user.user_id))]
pub async fn get_user_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();

  let user = user_service::user_by_id(&app_state.db_pool, user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found.", user_id)))?;

  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  if !req_user.role.permits(Permission::ManagePlatform) && req_user.id != user.id {
    return Err(AppError::Forbidden("Not allowed, contact Administrator.".to_string()));
  }

  Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::list_users", skip(app_state, auth_user, query), fields(caller = %auth_user.user_id))]
pub async fn list_users_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  if !req_user.role.permits(Permission::ManagePlatform) {
    return Err(AppError::Forbidden(
      "Only admins are allowed to perform this action.".to_string(),
    ));
  }

  let users: Vec<User> = sqlx::query_as(&format!("SELECT {} FROM users ORDER BY created_at ASC", USER_COLUMNS))
    .fetch_all(&app_state.db_pool)
    .await?;

  info!("Fetched {} users for admin listing.", users.len());
  let (page, page_size) = query.clamped();
  Ok(HttpResponse::Ok().json(paginate(users, page, page_size)))
}

#[instrument(name = "handler::update_user", skip(app_state, auth_user, path, payload), fields(caller = %auth_user.user_id))]
pub async fn update_user_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateUserPayload>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();

  let user = user_service::user_by_id(&app_state.db_pool, user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found.", user_id)))?;

  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  if !req_user.role.permits(Permission::ManagePlatform) && req_user.id != user.id {
    return Err(AppError::Forbidden("Not allowed, contact Administrator.".to_string()));
  }

  // Partial update: absent fields keep their stored values.
  let updated: User = sqlx::query_as(&format!(
    "UPDATE users SET \
       first_name = COALESCE($2, first_name), \
       middle_name = COALESCE($3, middle_name), \
       last_name = COALESCE($4, last_name), \
       phone = COALESCE($5, phone), \
       address = COALESCE($6, address), \
       updated_at = $7 \
     WHERE id = $1 \
     RETURNING {}",
    USER_COLUMNS
  ))
  .bind(user_id)
  .bind(&payload.first_name)
  .bind(&payload.middle_name)
  .bind(&payload.last_name)
  .bind(&payload.phone)
  .bind(&payload.address)
  .bind(Utc::now())
  .fetch_one(&app_state.db_pool)
  .await?;

  info!("User {} updated.", user_id);
  Ok(HttpResponse::Ok().json(updated))
}

#[instrument(name = "handler::update_user_role", skip(app_state, auth_user, path, payload), fields(caller = %auth_user.user_id))]
pub async fn update_user_role_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateRolePayload>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();

  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  if !req_user.role.permits(Permission::ManagePlatform) {
    return Err(AppError::Forbidden("Not allowed, contact Administrator.".to_string()));
  }

  if user_service::user_by_id(&app_state.db_pool, user_id).await?.is_none() {
    return Err(AppError::NotFound(format!("User with ID {} not found.", user_id)));
  }

  let updated: User = sqlx::query_as(&format!(
    "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
    USER_COLUMNS
  ))
  .bind(user_id)
  .bind(payload.role)
  .bind(Utc::now())
  .fetch_one(&app_state.db_pool)
  .await?;

  info!("Role of user {} changed to {:?} by {}.", user_id, payload.role, req_user.id);
  Ok(HttpResponse::Ok().json(updated))
}

#[instrument(name = "handler::delete_user", skip(app_state, auth_user, path), fields(caller = %auth_user.user_id))]
pub async fn delete_user_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();

  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  if !req_user.role.permits(Permission::ManagePlatform) {
    return Err(AppError::Forbidden("Not allowed, contact Administrator.".to_string()));
  }

  if user_service::user_by_id(&app_state.db_pool, user_id).await?.is_none() {
    return Err(AppError::NotFound(format!("User with ID {} not found.", user_id)));
  }

  sqlx::query("DELETE FROM users WHERE id = $1")
    .bind(user_id)
    .execute(&app_state.db_pool)
    .await?;

  info!("User {} deleted by admin {}.", user_id, req_user.id);
  Ok(HttpResponse::NoContent().finish())
}

// foodnest/src/web/extractors.rs

use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::auth_service;
use crate::state::AppState;

/// The verified caller identity, extracted from the bearer access token.
///
/// Only the user id travels in the token; handlers that need the caller's role
/// load the full record via `user_service::request_user`.
#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let result = (|| {
      let app_state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;

      let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Auth("Missing Authorization header.".to_string()))?;

      let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Expected a bearer token.".to_string()))?;

      let user_id = auth_service::decode_access_token(token, &app_state.config).map_err(|e| {
        warn!("Bearer token rejected: {}", e);
        e
      })?;

      Ok(AuthenticatedUser { user_id })
    })();

    futures_util::future::ready(result)
  }
}

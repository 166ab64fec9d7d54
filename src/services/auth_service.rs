// foodnest/src/services/auth_service.rs

//! Password hashing/verification and token issuance.

use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;

/// Hashes a plain-text password using Argon2 with a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", argon_err))
    })
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(false)` for a mismatch; only malformed stored hashes or internal
/// Argon2 failures surface as errors.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  pub iat: i64,
  pub exp: i64,
}

/// Issues a short-lived HS256 access token carrying the user id as subject.
pub fn issue_access_token(user_id: Uuid, config: &AppConfig) -> Result<String, AppError> {
  let now = Utc::now();
  let claims = Claims {
    sub: user_id,
    iat: now.timestamp(),
    exp: (now + Duration::minutes(config.access_token_expire_minutes)).timestamp(),
  };
  encode(
    &Header::default(),
    &claims,
    &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
  )
  .map_err(|e| AppError::Internal(format!("Failed to sign access token: {}", e)))
}

/// Issues a longer-lived HS512 refresh token.
pub fn issue_refresh_token(user_id: Uuid, config: &AppConfig) -> Result<String, AppError> {
  let now = Utc::now();
  let claims = Claims {
    sub: user_id,
    iat: now.timestamp(),
    exp: (now + Duration::days(config.refresh_token_expire_days)).timestamp(),
  };
  encode(
    &Header::new(Algorithm::HS512),
    &claims,
    &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
  )
  .map_err(|e| AppError::Internal(format!("Failed to sign refresh token: {}", e)))
}

/// Decodes an HS256 access token, returning the authenticated user id.
pub fn decode_access_token(token: &str, config: &AppConfig) -> Result<Uuid, AppError> {
  decode::<Claims>(
    token,
    &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
    &Validation::default(),
  )
  .map(|data| data.claims.sub)
  .map_err(|e| match e.kind() {
    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::Auth("Signature has expired".to_string()),
    _ => AppError::Auth("Invalid token".to_string()),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_config() -> AppConfig {
    AppConfig {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: "postgres://localhost/foodnest_test".to_string(),
      jwt_secret: "test-secret".to_string(),
      access_token_expire_minutes: 30,
      refresh_token_expire_days: 7,
    }
  }

  #[test]
  fn hash_then_verify_round_trip() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(verify_password(&hash, "correct horse battery staple").unwrap());
    assert!(!verify_password(&hash, "wrong password").unwrap());
  }

  #[test]
  fn empty_password_is_rejected() {
    assert!(matches!(hash_password(""), Err(AppError::Validation(_))));
  }

  #[test]
  fn garbled_stored_hash_is_an_internal_error() {
    assert!(matches!(
      verify_password("not-a-phc-string", "anything"),
      Err(AppError::Internal(_))
    ));
  }

  #[test]
  fn access_token_round_trip() {
    let config = test_config();
    let user_id = Uuid::new_v4();
    let token = issue_access_token(user_id, &config).unwrap();
    assert_eq!(decode_access_token(&token, &config).unwrap(), user_id);
  }

  #[test]
  fn refresh_token_is_not_a_valid_access_token() {
    // Access-token validation is pinned to HS256; HS512 refresh tokens must not pass.
    let config = test_config();
    let token = issue_refresh_token(Uuid::new_v4(), &config).unwrap();
    assert!(matches!(
      decode_access_token(&token, &config),
      Err(AppError::Auth(_))
    ));
  }

  #[test]
  fn tampered_token_is_rejected() {
    let config = test_config();
    let mut token = issue_access_token(Uuid::new_v4(), &config).unwrap();
    token.push('x');
    assert!(matches!(
      decode_access_token(&token, &config),
      Err(AppError::Auth(_))
    ));
  }
}

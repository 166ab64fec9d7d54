// foodnest/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)] // Clone is useful if parts of config are passed around
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  // Token signing configuration
  pub jwt_secret: String,
  pub access_token_expire_minutes: i64,
  pub refresh_token_expire_days: i64,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    let jwt_secret = get_env("SECRET_KEY")?;
    let access_token_expire_minutes = get_env("ACCESS_TOKEN_EXPIRE_MINUTES")
      .unwrap_or_else(|_| "30".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid ACCESS_TOKEN_EXPIRE_MINUTES: {}", e)))?;
    let refresh_token_expire_days = get_env("REFRESH_TOKEN_EXPIRE_DAYS")
      .unwrap_or_else(|_| "7".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid REFRESH_TOKEN_EXPIRE_DAYS: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      jwt_secret,
      access_token_expire_minutes,
      refresh_token_expire_days,
    })
  }
}

// foodnest/src/services/mod.rs

//! Business logic invoked by the HTTP handlers.

pub mod auth_service;
pub mod order_service;
pub mod user_service;

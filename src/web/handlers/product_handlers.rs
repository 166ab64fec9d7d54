// foodnest/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Product, ProductCategory};
use crate::pagination::paginate;
use crate::permissions::Permission;
use crate::services::user_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::PageQuery;

const PRODUCT_COLUMNS: &str =
  "id, name, description, category, unit, price_per_unit, stock_quantity, seller_id, is_available, created_at";

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct CreateProductPayload {
  pub name: String,
  pub description: String,
  pub category: ProductCategory,
  pub unit: String,
  pub price_per_unit: Decimal,
  pub stock_quantity: i32,
  pub is_available: Option<bool>, // defaults to true
}

#[derive(Deserialize, Debug)]
pub struct UpdateProductPayload {
  pub name: Option<String>,
  pub description: Option<String>,
  pub category: Option<ProductCategory>,
  pub unit: Option<String>,
  pub price_per_unit: Option<Decimal>,
  pub stock_quantity: Option<i32>,
  pub is_available: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  pub category: Option<ProductCategory>,
  pub available: Option<bool>,
  pub page: Option<usize>,
  pub page_size: Option<usize>,
}

// --- Handler Implementations ---

#[instrument(name = "handler::list_products", skip(app_state, query))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let products: Vec<Product> = sqlx::query_as(&format!(
    "SELECT {} FROM products \
     WHERE ($1::product_category_enum IS NULL OR category = $1) \
       AND ($2::boolean IS NULL OR is_available = $2) \
     ORDER BY name ASC",
    PRODUCT_COLUMNS
  ))
  .bind(query.category)
  .bind(query.available)
  .fetch_all(&app_state.db_pool)
  .await?;

  info!("Fetched {} products.", products.len());
  let (page, page_size) = PageQuery {
    page: query.page,
    page_size: query.page_size,
  }
  .clamped();
  Ok(HttpResponse::Ok().json(paginate(products, page, page_size)))
}

#[instrument(name = "handler::get_product", skip(app_state, path))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  let product: Option<Product> = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
    .bind(product_id)
    .fetch_optional(&app_state.db_pool)
    .await?;

  match product {
    Some(product) => Ok(HttpResponse::Ok().json(product)),
    None => {
      warn!("Product with ID {} not found.", product_id);
      Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
    }
  }
}

#[instrument(name = "handler::create_product", skip(app_state, auth_user, payload), fields(caller = %auth_user.user_id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<CreateProductPayload>,
) -> Result<HttpResponse, AppError> {
  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  if !req_user.role.permits(Permission::CreateProduct) {
    return Err(AppError::Forbidden(
      "Only wholesalers or admins can perform this action.".to_string(),
    ));
  }

  // The caller is the seller; duplicate listings per seller are rejected.
  let existing: Option<Product> = sqlx::query_as(&format!(
    "SELECT {} FROM products WHERE name = $1 AND seller_id = $2",
    PRODUCT_COLUMNS
  ))
  .bind(&payload.name)
  .bind(req_user.id)
  .fetch_optional(&app_state.db_pool)
  .await?;
  if existing.is_some() {
    return Err(AppError::Conflict("Product already exists.".to_string()));
  }

  let product: Product = sqlx::query_as(&format!(
    "INSERT INTO products (id, name, description, category, unit, price_per_unit, stock_quantity, seller_id, is_available, created_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
     RETURNING {}",
    PRODUCT_COLUMNS
  ))
  .bind(Uuid::new_v4())
  .bind(&payload.name)
  .bind(&payload.description)
  .bind(payload.category)
  .bind(&payload.unit)
  .bind(payload.price_per_unit)
  .bind(payload.stock_quantity)
  .bind(req_user.id)
  .bind(payload.is_available.unwrap_or(true))
  .bind(Utc::now())
  .fetch_one(&app_state.db_pool)
  .await?;

  info!("Product {} created by seller {}.", product.id, req_user.id);
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::update_product", skip(app_state, auth_user, path, payload), fields(caller = %auth_user.user_id))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateProductPayload>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  let product: Option<Product> = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
    .bind(product_id)
    .fetch_optional(&app_state.db_pool)
    .await?;
  let product = product.ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;

  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  if !req_user.role.permits(Permission::ManagePlatform) && req_user.id != product.seller_id {
    return Err(AppError::Forbidden(
      "Only admins or the product owner can perform this action.".to_string(),
    ));
  }

  let updated: Product = sqlx::query_as(&format!(
    "UPDATE products SET \
       name = COALESCE($2, name), \
       description = COALESCE($3, description), \
       category = COALESCE($4, category), \
       unit = COALESCE($5, unit), \
       price_per_unit = COALESCE($6, price_per_unit), \
       stock_quantity = COALESCE($7, stock_quantity), \
       is_available = COALESCE($8, is_available) \
     WHERE id = $1 \
     RETURNING {}",
    PRODUCT_COLUMNS
  ))
  .bind(product_id)
  .bind(&payload.name)
  .bind(&payload.description)
  .bind(payload.category)
  .bind(&payload.unit)
  .bind(payload.price_per_unit)
  .bind(payload.stock_quantity)
  .bind(payload.is_available)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!("Product {} updated by {}.", product_id, req_user.id);
  Ok(HttpResponse::Ok().json(updated))
}

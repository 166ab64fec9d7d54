// foodnest/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Order, OrderStatus, User};
use crate::pagination::paginate;
use crate::permissions::Permission;
use crate::services::order_service::{self, RequestedItem};
use crate::services::user_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::PageQuery;

const ORDER_COLUMNS: &str = "id, buyer_id, items, total_price, status, created_at, updated_at";

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
  pub items: Vec<RequestedItem>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateOrderPayload {
  pub id: Uuid,
  pub items: Vec<RequestedItem>,
}

#[derive(Deserialize, Debug)]
pub struct ListOrdersQuery {
  pub status: Option<OrderStatus>,
  pub page: Option<usize>,
  pub page_size: Option<usize>,
}

fn check_quantities(items: &[RequestedItem]) -> Result<(), AppError> {
  for item in items {
    if item.quantity < 1 {
      return Err(AppError::Validation(format!(
        "Quantity for product {} must be at least 1.",
        item.product_id
      )));
    }
  }
  Ok(())
}

async fn fetch_order(app_state: &AppState, order_id: Uuid) -> Result<Order, AppError> {
  let order: Option<Order> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
    .bind(order_id)
    .fetch_optional(&app_state.db_pool)
    .await?;
  order.ok_or_else(|| AppError::NotFound(format!("Order with ID {} not found.", order_id)))
}

// Retailers only ever see their own orders; admins and wholesalers are not
// restricted to a buyer match.
fn check_order_access(req_user: &User, order: &Order) -> Result<(), AppError> {
  if !req_user.role.permits(Permission::ViewOwnRecords) {
    return Err(AppError::Forbidden("Not allowed, contact Administrator.".to_string()));
  }
  if req_user.role.permits(Permission::PlaceOrders) && req_user.id != order.buyer_id {
    return Err(AppError::Forbidden("Not allowed, contact Administrator.".to_string()));
  }
  Ok(())
}

// Admins may amend or delete any order; retailers only orders they placed.
fn check_order_mutation(req_user: &User, order: &Order) -> Result<(), AppError> {
  if req_user.role.permits(Permission::ManagePlatform) {
    return Ok(());
  }
  if req_user.role.permits(Permission::PlaceOrders) && req_user.id == order.buyer_id {
    return Ok(());
  }
  Err(AppError::Forbidden("Not allowed, contact Administrator.".to_string()))
}

// --- Handler Implementations ---

#[instrument(name = "handler::create_order", skip(app_state, auth_user, payload), fields(caller = %auth_user.user_id, requested = payload.items.len()))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  if !req_user.role.permits(Permission::PlaceOrders) {
    return Err(AppError::Forbidden("Not allowed, contact Administrator.".to_string()));
  }
  check_quantities(&payload.items)?;

  let order = order_service::create_order(&app_state.db_pool, req_user.id, &payload.items).await?;

  Ok(HttpResponse::Created().json(json!({
      "message": "Order created successfully.",
      "order_id": order.id,
      "total_price": order.total_price,
      "items": order.items,
  })))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user, path), fields(caller = %auth_user.user_id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();

  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  let order = fetch_order(&app_state, order_id).await?;
  check_order_access(&req_user, &order)?;

  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user, query), fields(caller = %auth_user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  query: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse, AppError> {
  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  if !req_user.role.permits(Permission::ViewOwnRecords) {
    return Err(AppError::Forbidden("Not allowed.".to_string()));
  }

  let orders: Vec<Order> = if req_user.role.permits(Permission::ManagePlatform) {
    sqlx::query_as(&format!(
      "SELECT {} FROM orders \
       WHERE ($1::order_status_enum IS NULL OR status = $1) \
       ORDER BY created_at DESC",
      ORDER_COLUMNS
    ))
    .bind(query.status)
    .fetch_all(&app_state.db_pool)
    .await?
  } else {
    sqlx::query_as(&format!(
      "SELECT {} FROM orders \
       WHERE buyer_id = $1 AND ($2::order_status_enum IS NULL OR status = $2) \
       ORDER BY created_at DESC",
      ORDER_COLUMNS
    ))
    .bind(req_user.id)
    .bind(query.status)
    .fetch_all(&app_state.db_pool)
    .await?
  };

  info!("Fetched {} orders for caller {}.", orders.len(), req_user.id);
  let (page, page_size) = PageQuery {
    page: query.page,
    page_size: query.page_size,
  }
  .clamped();
  Ok(HttpResponse::Ok().json(paginate(orders, page, page_size)))
}

#[instrument(name = "handler::update_order", skip(app_state, auth_user, payload), fields(caller = %auth_user.user_id, order_id = %payload.id))]
pub async fn update_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<UpdateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  check_quantities(&payload.items)?;

  let existing = fetch_order(&app_state, payload.id).await?;
  check_order_mutation(&req_user, &existing).map_err(|e| {
    warn!(
      "User {} attempted to update order {} they may not amend.",
      req_user.id, payload.id
    );
    e
  })?;

  let items = order_service::replace_order_items(&app_state.db_pool, payload.id, &payload.items).await?;

  Ok(HttpResponse::Ok().json(json!({
      "detail": "Order updated successfully.",
      "order_id": payload.id,
      "total_price": order_service::total_of(&items),
      "items": items,
  })))
}

#[instrument(name = "handler::delete_order", skip(app_state, auth_user, path), fields(caller = %auth_user.user_id))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();

  let req_user = user_service::request_user(&app_state.db_pool, auth_user.user_id).await?;
  let order = fetch_order(&app_state, order_id).await?;

  check_order_mutation(&req_user, &order)?;

  sqlx::query("DELETE FROM orders WHERE id = $1")
    .bind(order_id)
    .execute(&app_state.db_pool)
    .await?;

  info!("Order {} deleted by {}.", order_id, req_user.id);
  Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Role;
  use chrono::Utc;
  use rust_decimal::Decimal;
  use sqlx::types::Json;

  fn user_with_role(role: Role) -> User {
    let now = Utc::now();
    User {
      id: Uuid::new_v4(),
      email: "someone@example.com".to_string(),
      password_hash: String::new(),
      first_name: None,
      middle_name: None,
      last_name: None,
      phone: None,
      address: None,
      role,
      is_active: true,
      last_login: None,
      created_at: now,
      updated_at: now,
    }
  }

  fn order_of(buyer_id: Uuid) -> Order {
    let now = Utc::now();
    Order {
      id: Uuid::new_v4(),
      buyer_id,
      items: Json(Vec::new()),
      total_price: Decimal::ZERO,
      status: OrderStatus::Pending,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn admin_may_mutate_any_order() {
    let admin = user_with_role(Role::Admin);
    let order = order_of(Uuid::new_v4()); // someone else's order
    assert!(check_order_mutation(&admin, &order).is_ok());
  }

  #[test]
  fn retailer_may_mutate_only_own_order() {
    let retailer = user_with_role(Role::Retailer);
    let own = order_of(retailer.id);
    let foreign = order_of(Uuid::new_v4());
    assert!(check_order_mutation(&retailer, &own).is_ok());
    assert!(matches!(
      check_order_mutation(&retailer, &foreign),
      Err(AppError::Forbidden(_))
    ));
  }

  #[test]
  fn other_roles_may_not_mutate_orders() {
    for role in [Role::Wholesaler, Role::Dispatch] {
      let user = user_with_role(role);
      let own = order_of(user.id);
      assert!(
        matches!(check_order_mutation(&user, &own), Err(AppError::Forbidden(_))),
        "role {:?} must not amend orders",
        role
      );
    }
  }

  #[test]
  fn retailer_cannot_view_foreign_order() {
    let retailer = user_with_role(Role::Retailer);
    let foreign = order_of(Uuid::new_v4());
    assert!(matches!(
      check_order_access(&retailer, &foreign),
      Err(AppError::Forbidden(_))
    ));

    let admin = user_with_role(Role::Admin);
    assert!(check_order_access(&admin, &foreign).is_ok());
  }
}

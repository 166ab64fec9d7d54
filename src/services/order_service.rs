// foodnest/src/services/order_service.rs

//! Order line-item materialization and the two flows that drive it.
//!
//! The materializer resolves each requested (product, quantity) pair into a
//! priced snapshot line item. It is read-only against the product store; the
//! creation and update flows below own persistence and the total-price
//! invariant (total_price == sum of line-item subtotals).

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Order, OrderItem, OrderStatus, Product};

/// One requested order line as it arrives from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestedItem {
  pub product_id: Uuid,
  pub quantity: i32,
}

/// Product lookup seam. The materializer only ever reads through this, which
/// keeps it testable against an in-memory source.
#[async_trait]
pub trait ProductSource {
  async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError>;
}

#[async_trait]
impl ProductSource for PgPool {
  async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
    let product: Option<Product> = sqlx::query_as(
      "SELECT id, name, description, category, unit, price_per_unit, stock_quantity, seller_id, is_available, created_at \
       FROM products WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(self)
    .await?;
    Ok(product)
  }
}

/// Order persistence seam for the creation flow. Kept narrow so tests can
/// observe exactly which rows would have been written.
#[async_trait]
pub trait OrderSink {
  async fn insert_order(&self, order: &Order) -> Result<(), AppError>;
}

#[async_trait]
impl OrderSink for PgPool {
  async fn insert_order(&self, order: &Order) -> Result<(), AppError> {
    sqlx::query(
      "INSERT INTO orders (id, buyer_id, items, total_price, status, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(order.id)
    .bind(order.buyer_id)
    .bind(&order.items)
    .bind(order.total_price)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(self)
    .await?;
    Ok(())
  }
}

/// Resolves every requested pair into a snapshot line item and appends it to
/// `accumulator`, preserving request order.
///
/// Fails fast on the first product reference that does not resolve; nothing is
/// skipped and no partial result is returned. Subtotals use decimal arithmetic
/// (price_per_unit * quantity), so no float rounding creeps in.
#[instrument(name = "order_service::materialize_order_items", skip(products, accumulator, requested), fields(order_id = %order_id, requested = requested.len()))]
pub async fn materialize_order_items<S: ProductSource + Sync>(
  products: &S,
  order_id: Uuid,
  mut accumulator: Vec<OrderItem>,
  requested: &[RequestedItem],
) -> Result<Vec<OrderItem>, AppError> {
  for item in requested {
    let product = products
      .product_by_id(item.product_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", item.product_id)))?;

    let subtotal = product.price_per_unit * Decimal::from(item.quantity);
    accumulator.push(OrderItem {
      order_id,
      product_id: product.id,
      product_name: product.name,
      product_description: product.description,
      price_per_unit: product.price_per_unit,
      quantity: item.quantity,
      subtotal,
    });
  }
  Ok(accumulator)
}

/// Sum of line-item subtotals; the only way order totals are ever computed.
pub fn total_of(items: &[OrderItem]) -> Decimal {
  items.iter().map(|item| item.subtotal).sum()
}

/// Creates a new pending order for `buyer_id` from the requested items.
///
/// Items are materialized against a freshly generated order id before anything
/// is written, and the order row is inserted complete in one statement. A
/// materialization failure therefore leaves no partial order behind.
#[instrument(name = "order_service::create_order", skip(store, requested), fields(buyer_id = %buyer_id))]
pub async fn create_order<S>(store: &S, buyer_id: Uuid, requested: &[RequestedItem]) -> Result<Order, AppError>
where
  S: ProductSource + OrderSink + Sync,
{
  let order_id = Uuid::new_v4();
  let items = materialize_order_items(store, order_id, Vec::new(), requested).await?;
  let total_price = total_of(&items);
  let now = Utc::now();

  let order = Order {
    id: order_id,
    buyer_id,
    items: Json(items),
    total_price,
    status: OrderStatus::Pending,
    created_at: now,
    updated_at: now,
  };
  store.insert_order(&order).await?;

  info!(order_id = %order.id, total = %order.total_price, "Order created.");
  Ok(order)
}

/// Replaces an order's item set with a freshly materialized list.
///
/// Full replace-on-update: the new requested items are materialized from an
/// empty accumulator and overwrite whatever was there, with the total
/// recomputed. Concurrent updates are last-writer-wins; no locking is taken.
#[instrument(name = "order_service::replace_order_items", skip(db_pool, requested), fields(order_id = %order_id))]
pub async fn replace_order_items(
  db_pool: &PgPool,
  order_id: Uuid,
  requested: &[RequestedItem],
) -> Result<Vec<OrderItem>, AppError> {
  let items = materialize_order_items(db_pool, order_id, Vec::new(), requested).await?;
  let total_price = total_of(&items);

  sqlx::query("UPDATE orders SET items = $1, total_price = $2, updated_at = $3 WHERE id = $4")
    .bind(Json(&items))
    .bind(total_price)
    .bind(Utc::now())
    .bind(order_id)
    .execute(db_pool)
    .await?;

  info!(order_id = %order_id, total = %total_price, "Order items replaced.");
  Ok(items)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ProductCategory;
  use rust_decimal_macros::dec;
  use std::collections::HashMap;

  struct InMemoryProducts(HashMap<Uuid, Product>);

  #[async_trait]
  impl ProductSource for InMemoryProducts {
    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
      Ok(self.0.get(&id).cloned())
    }
  }

  fn product(name: &str, price_per_unit: Decimal) -> Product {
    Product {
      id: Uuid::new_v4(),
      name: name.to_string(),
      description: format!("{} description", name),
      category: ProductCategory::Grains,
      unit: "kg".to_string(),
      price_per_unit,
      stock_quantity: 100,
      seller_id: Uuid::new_v4(),
      is_available: true,
      created_at: Utc::now(),
    }
  }

  fn source(products: &[&Product]) -> InMemoryProducts {
    InMemoryProducts(products.iter().map(|p| (p.id, (*p).clone())).collect())
  }

  /// Store double for the creation flow: product lookups plus a record of
  /// every order row that would have been written.
  struct InMemoryStore {
    products: HashMap<Uuid, Product>,
    inserted: std::sync::Mutex<Vec<Order>>,
  }

  impl InMemoryStore {
    fn new(products: &[&Product]) -> Self {
      Self {
        products: products.iter().map(|p| (p.id, (*p).clone())).collect(),
        inserted: std::sync::Mutex::new(Vec::new()),
      }
    }
  }

  #[async_trait]
  impl ProductSource for InMemoryStore {
    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
      Ok(self.products.get(&id).cloned())
    }
  }

  #[async_trait]
  impl OrderSink for InMemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<(), AppError> {
      self.inserted.lock().unwrap().push(order.clone());
      Ok(())
    }
  }

  #[tokio::test]
  async fn subtotal_is_exact_decimal_product() {
    let p1 = product("Maize", dec!(2.50));
    let src = source(&[&p1]);
    let order_id = Uuid::new_v4();

    let items = materialize_order_items(
      &src,
      order_id,
      Vec::new(),
      &[RequestedItem {
        product_id: p1.id,
        quantity: 4,
      }],
    )
    .await
    .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].subtotal, dec!(10.00));
    assert_eq!(items[0].order_id, order_id);
    assert_eq!(items[0].product_name, "Maize");
    assert_eq!(items[0].price_per_unit, dec!(2.50));
  }

  #[tokio::test]
  async fn total_is_sum_of_subtotals() {
    let p1 = product("Maize", dec!(2.50));
    let p2 = product("Beans", dec!(1.00));
    let src = source(&[&p1, &p2]);

    let items = materialize_order_items(
      &src,
      Uuid::new_v4(),
      Vec::new(),
      &[
        RequestedItem {
          product_id: p1.id,
          quantity: 4,
        },
        RequestedItem {
          product_id: p2.id,
          quantity: 2,
        },
      ],
    )
    .await
    .unwrap();

    assert_eq!(total_of(&items), dec!(12.00));
  }

  #[tokio::test]
  async fn line_items_preserve_request_order() {
    let p1 = product("Maize", dec!(2.00));
    let p2 = product("Beans", dec!(3.00));
    let p3 = product("Millet", dec!(4.00));
    let src = source(&[&p1, &p2, &p3]);

    // Deliberately not in any sorted order.
    let requested = [
      RequestedItem {
        product_id: p2.id,
        quantity: 1,
      },
      RequestedItem {
        product_id: p3.id,
        quantity: 1,
      },
      RequestedItem {
        product_id: p1.id,
        quantity: 1,
      },
    ];

    let items = materialize_order_items(&src, Uuid::new_v4(), Vec::new(), &requested)
      .await
      .unwrap();

    let got: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    assert_eq!(got, vec![p2.id, p3.id, p1.id]);
  }

  #[tokio::test]
  async fn unknown_product_fails_the_whole_batch() {
    let p1 = product("Maize", dec!(2.00));
    let src = source(&[&p1]);

    let result = materialize_order_items(
      &src,
      Uuid::new_v4(),
      Vec::new(),
      &[
        RequestedItem {
          product_id: p1.id,
          quantity: 1,
        },
        RequestedItem {
          product_id: Uuid::new_v4(), // does not exist
          quantity: 1,
        },
      ],
    )
    .await;

    // Fail fast: the error surfaces even though the first line resolved, and
    // the caller never sees a partial list to commit.
    assert!(matches!(result, Err(AppError::NotFound(_))));
  }

  #[tokio::test]
  async fn accumulator_is_appended_to_not_replaced() {
    let p1 = product("Maize", dec!(2.00));
    let p2 = product("Beans", dec!(3.00));
    let src = source(&[&p1, &p2]);
    let order_id = Uuid::new_v4();

    let first = materialize_order_items(
      &src,
      order_id,
      Vec::new(),
      &[RequestedItem {
        product_id: p1.id,
        quantity: 1,
      }],
    )
    .await
    .unwrap();

    let both = materialize_order_items(
      &src,
      order_id,
      first,
      &[RequestedItem {
        product_id: p2.id,
        quantity: 1,
      }],
    )
    .await
    .unwrap();

    assert_eq!(both.len(), 2);
    assert_eq!(both[0].product_id, p1.id);
    assert_eq!(both[1].product_id, p2.id);
  }

  #[tokio::test]
  async fn failed_creation_writes_no_order_row() {
    let p1 = product("Maize", dec!(2.00));
    let store = InMemoryStore::new(&[&p1]);

    let result = create_order(
      &store,
      Uuid::new_v4(),
      &[
        RequestedItem {
          product_id: p1.id,
          quantity: 1,
        },
        RequestedItem {
          product_id: Uuid::new_v4(), // does not exist
          quantity: 1,
        },
      ],
    )
    .await;

    // The unresolved reference aborts before any insert: no pending order is
    // left behind for the caller to clean up.
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(store.inserted.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn successful_creation_inserts_one_complete_order() {
    let p1 = product("Maize", dec!(2.50));
    let p2 = product("Beans", dec!(1.00));
    let store = InMemoryStore::new(&[&p1, &p2]);
    let buyer_id = Uuid::new_v4();

    let order = create_order(
      &store,
      buyer_id,
      &[
        RequestedItem {
          product_id: p1.id,
          quantity: 4,
        },
        RequestedItem {
          product_id: p2.id,
          quantity: 2,
        },
      ],
    )
    .await
    .unwrap();

    assert_eq!(order.buyer_id, buyer_id);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, dec!(12.00));
    assert_eq!(order.items.0.len(), 2);
    assert!(order.items.0.iter().all(|item| item.order_id == order.id));

    let inserted = store.inserted.lock().unwrap();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].id, order.id);
    assert_eq!(inserted[0].total_price, dec!(12.00));
  }

  #[tokio::test]
  async fn empty_request_yields_empty_items_and_zero_total() {
    let src = source(&[]);
    let items = materialize_order_items(&src, Uuid::new_v4(), Vec::new(), &[])
      .await
      .unwrap();
    assert!(items.is_empty());
    assert_eq!(total_of(&items), Decimal::ZERO);
  }

  #[tokio::test]
  async fn snapshot_does_not_follow_later_price_changes() {
    let mut p1 = product("Maize", dec!(2.50));
    let src = source(&[&p1]);

    let items = materialize_order_items(
      &src,
      Uuid::new_v4(),
      Vec::new(),
      &[RequestedItem {
        product_id: p1.id,
        quantity: 2,
      }],
    )
    .await
    .unwrap();

    // Mutating the product afterwards must not affect the snapshot.
    p1.price_per_unit = dec!(9.99);
    assert_eq!(items[0].price_per_unit, dec!(2.50));
    assert_eq!(items[0].subtotal, dec!(5.00));
  }
}

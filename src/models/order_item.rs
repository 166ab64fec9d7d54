// foodnest/src/models/order_item.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A priced snapshot of one product line within an order.
///
/// Name, description, and unit price are denormalized at materialization time;
/// later product edits do not retroactively change existing orders. Line items
/// live inside the order's `items` JSON column, so this type round-trips
/// through serde rather than `FromRow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub product_name: String,
  pub product_description: String,
  pub price_per_unit: Decimal,
  pub quantity: i32,
  /// Always price_per_unit * quantity; recomputed whenever the item set changes.
  pub subtotal: Decimal,
}

// foodnest/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "product_category_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
  Grains,
  Vegetables,
  Nuts,
  Dairy,
  Roots,
  Other,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  pub category: ProductCategory,
  pub unit: String, // e.g. "kg", "crate"
  pub price_per_unit: Decimal,
  pub stock_quantity: i32,
  pub seller_id: Uuid,
  pub is_available: bool,
  pub created_at: DateTime<Utc>,
}

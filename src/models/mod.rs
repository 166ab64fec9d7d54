// foodnest/src/models/mod.rs

//! Contains data structures representing database entities.

// Declare child modules for each model
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

// Re-export the model structs for convenient access
pub use order::{Order, OrderStatus};
pub use order_item::OrderItem;
pub use product::{Product, ProductCategory};
pub use user::{Role, User};

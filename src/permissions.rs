// foodnest/src/permissions.rs

//! Role-based permission table.
//!
//! Each permission maps to the closed set of roles that hold it; handlers ask
//! `role.permits(Permission::X)` instead of comparing roles inline. Adding a
//! permission means adding a variant and one row in `allowed_roles`.

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
  /// Platform administration: user listing, role changes, deletions.
  ManagePlatform,
  /// Creating and editing product listings.
  CreateProduct,
  /// Viewing/managing records the caller is a party to (orders, own profile).
  ViewOwnRecords,
  /// Wholesaler-specific actions (managing own listings).
  SupplyProducts,
  /// Placing and amending orders.
  PlaceOrders,
  /// Fulfilment actions.
  DispatchOrders,
}

impl Permission {
  /// The role-membership table. Pure data; no state, no side effects.
  pub fn allowed_roles(self) -> &'static [Role] {
    match self {
      Permission::ManagePlatform => &[Role::Admin],
      Permission::CreateProduct => &[Role::Admin, Role::Wholesaler],
      Permission::ViewOwnRecords => &[Role::Admin, Role::Wholesaler, Role::Retailer],
      Permission::SupplyProducts => &[Role::Wholesaler],
      Permission::PlaceOrders => &[Role::Retailer],
      Permission::DispatchOrders => &[Role::Dispatch],
    }
  }
}

impl Role {
  pub fn permits(self, permission: Permission) -> bool {
    permission.allowed_roles().contains(&self)
  }
}

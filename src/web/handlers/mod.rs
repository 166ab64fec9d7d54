// foodnest/src/web/handlers/mod.rs

pub mod account_handlers;
pub mod order_handlers;
pub mod product_handlers;

use serde::Deserialize;

/// Shared page/page_size query parameters for list endpoints.
#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
  pub page: Option<usize>,
  pub page_size: Option<usize>,
}

impl PageQuery {
  /// Clamps to page >= 1 and 1 <= page_size <= 100, defaulting to page 1 of 10.
  pub fn clamped(&self) -> (usize, usize) {
    let page = self.page.unwrap_or(1).max(1);
    let page_size = self.page_size.unwrap_or(10).clamp(1, 100);
    (page, page_size)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_query_defaults_and_clamps() {
    assert_eq!(PageQuery::default().clamped(), (1, 10));
    assert_eq!(
      PageQuery {
        page: Some(0),
        page_size: Some(500),
      }
      .clamped(),
      (1, 100)
    );
    assert_eq!(
      PageQuery {
        page: Some(3),
        page_size: Some(25),
      }
      .clamped(),
      (3, 25)
    );
  }
}

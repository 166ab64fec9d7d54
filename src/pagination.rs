// foodnest/src/pagination.rs

//! Slices an already-fetched in-memory list into a page plus metadata.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
  pub page: usize,
  pub page_size: usize,
  pub total_items: usize,
  pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub meta: PageMeta,
}

/// Pages are 1-based; a page past the end yields an empty item list with the
/// same metadata. `page_size` is validated at the query-parameter boundary and
/// is always >= 1 here.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
  let total_items = items.len();
  let total_pages = (total_items + page_size - 1) / page_size;
  let start = (page - 1) * page_size;

  let items = items
    .into_iter()
    .skip(start)
    .take(page_size)
    .collect();

  Page {
    items,
    meta: PageMeta {
      page,
      page_size,
      total_items,
      total_pages,
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splits_into_pages_with_partial_tail() {
    let items: Vec<i32> = (1..=25).collect();
    let page = paginate(items.clone(), 3, 10);
    assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
    assert_eq!(
      page.meta,
      PageMeta {
        page: 3,
        page_size: 10,
        total_items: 25,
        total_pages: 3,
      }
    );
  }

  #[test]
  fn empty_input_has_zero_pages() {
    let page = paginate(Vec::<i32>::new(), 1, 10);
    assert!(page.items.is_empty());
    assert_eq!(page.meta.total_items, 0);
    assert_eq!(page.meta.total_pages, 0);
  }

  #[test]
  fn page_past_the_end_is_empty_but_keeps_meta() {
    let page = paginate(vec![1, 2, 3], 5, 2);
    assert!(page.items.is_empty());
    assert_eq!(page.meta.total_items, 3);
    assert_eq!(page.meta.total_pages, 2);
  }

  #[test]
  fn exact_multiple_has_no_extra_page() {
    let page = paginate((1..=20).collect::<Vec<i32>>(), 1, 10);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.meta.total_pages, 2);
  }
}

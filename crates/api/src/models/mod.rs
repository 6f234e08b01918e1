//! Domain models for the API.
//!
//! These are the entities held by the [`MemoryStore`](crate::store::MemoryStore)
//! and serialized directly as response bodies (camelCase JSON).

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{Cart, CartItem};
pub use category::{Category, CategoryNode};
pub use order::{Order, OrderItem};
pub use product::Product;
pub use session::{AuthSession, AuthUser};
pub use user::User;

/// Paginated list envelope: `{items, total, limit, offset}`.
///
/// `total` is the number of items that matched before pagination.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    /// Cut one page out of an already filtered and sorted list.
    #[must_use]
    pub fn slice(items: Vec<T>, limit: usize, offset: usize) -> Self {
        let total = items.len();
        let items = items.into_iter().skip(offset).take(limit).collect();
        Self {
            items,
            total,
            limit,
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_slice_middle() {
        let page = Page::slice((0..10).collect(), 3, 4);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 10);
        assert_eq!((page.limit, page.offset), (3, 4));
    }

    #[test]
    fn test_page_slice_past_end() {
        let page = Page::slice((0..5).collect::<Vec<_>>(), 10, 8);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_page_slice_short_tail() {
        let page = Page::slice((0..5).collect(), 10, 3);
        assert_eq!(page.items, vec![3, 4]);
    }
}

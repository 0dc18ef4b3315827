/// Database models for Taskforge
///
/// Each model owns its SQL operations, taking a `PgPool` (or transaction)
/// explicitly.
///
/// # Models
///
/// - `user`: Accounts with a global member/admin role
/// - `project`: User-owned projects
/// - `task`: Tasks nested under projects, tagged many-to-many
/// - `tag`: Global tag vocabulary, admin-managed

pub mod project;
pub mod tag;
pub mod task;
pub mod user;

use serde::Serialize;

/// One page of a scoped, filtered listing
///
/// Carries the total row count and current page so callers can render
/// navigation. An empty `data` vector is a valid page, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Rows on this page, newest-created first
    pub data: Vec<T>,

    /// Total rows matching the scope + filters, across all pages
    pub total: i64,

    /// 1-based page number this slice represents
    pub current_page: i64,

    /// Page size used for the slice
    pub per_page: i64,
}

impl<T> Page<T> {
    /// Number of pages implied by `total` and `per_page`
    pub fn last_page(&self) -> i64 {
        if self.total == 0 {
            1
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }
}

/// Upper bound for caller-supplied page numbers
///
/// Keeps `(page - 1) * per_page` far away from overflow and from
/// negative OFFSET values however absurd the query string is.
const MAX_PAGE: i64 = 1_000_000;

/// Clamps a caller-supplied page number to `1..=MAX_PAGE`
pub(crate) fn normalize_page(page: i64) -> i64 {
    page.clamp(1, MAX_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_last_page() {
        let page: Page<u8> = Page {
            data: vec![],
            total: 0,
            current_page: 1,
            per_page: 15,
        };
        assert_eq!(page.last_page(), 1);

        let page: Page<u8> = Page {
            data: vec![],
            total: 15,
            current_page: 1,
            per_page: 15,
        };
        assert_eq!(page.last_page(), 1);

        let page: Page<u8> = Page {
            data: vec![],
            total: 16,
            current_page: 2,
            per_page: 15,
        };
        assert_eq!(page.last_page(), 2);
    }

    #[test]
    fn test_normalize_page() {
        assert_eq!(normalize_page(-3), 1);
        assert_eq!(normalize_page(0), 1);
        assert_eq!(normalize_page(7), 7);
        assert_eq!(normalize_page(i64::MAX), MAX_PAGE);
        // The clamped offset stays well inside i64 for any page size
        assert!(normalize_page(i64::MAX)
            .checked_mul(1000)
            .is_some());
    }
}

use serde::{Deserialize, Serialize};

// Re-export UserRole and Permission from the permission module
pub use crate::domains::permission::{UserRole, Permission};

/// Rows per page used by the history and contacts listings
pub const DEFAULT_ROWS_PER_PAGE: u32 = 10;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl PaginationParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Zero-based index of the first row on this page
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.per_page as usize
    }
}

/// Paginated result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, params: PaginationParams) -> Self {
        let per_page = params.per_page.max(1) as u64;
        let total_pages = ((total + per_page - 1) / per_page) as u32;
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
            total_pages,
        }
    }
}

impl<T: Clone> PaginatedResult<T> {
    /// Slice an already-loaded, ordered list into one page.
    ///
    /// A page past the end yields an empty `items` with the real totals.
    pub fn from_slice(rows: &[T], params: PaginationParams) -> Self {
        let start = params.offset().min(rows.len());
        let end = (start + params.per_page as usize).min(rows.len());
        Self::new(rows[start..end].to_vec(), rows.len() as u64, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_pages() {
        let rows: Vec<u32> = (1..=23).collect();
        let page = PaginatedResult::from_slice(&rows, PaginationParams::new(3, 10));
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_from_slice_past_end_is_empty() {
        let rows = vec!["a", "b"];
        let page = PaginatedResult::from_slice(&rows, PaginationParams::new(5, 10));
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_zero_page_is_clamped() {
        let params = PaginationParams::new(0, 0);
        assert_eq!(params, PaginationParams { page: 1, per_page: 1 });
        assert_eq!(params.offset(), 0);
    }
}

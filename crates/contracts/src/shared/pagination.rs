use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 50;

/// Query string for paginated lists (`?page=2&limit=20`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl PageQuery {
    /// Page number starting at 1; missing or zero becomes 1.
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn limit(&self) -> u64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    /// Rows to skip; saturates at `i64::MAX`, the largest offset SQLite accepts.
    pub fn offset(&self) -> u64 {
        (self.page() - 1)
            .saturating_mul(self.limit())
            .min(i64::MAX as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(query: &PageQuery, total: u64) -> Self {
        let limit = query.limit();
        Self {
            page: query.page(),
            limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), DEFAULT_PAGE_LIMIT);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_clamps_out_of_range_values() {
        let q = PageQuery {
            page: Some(0),
            limit: Some(500),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), MAX_PAGE_LIMIT);

        let q = PageQuery {
            page: Some(3),
            limit: Some(0),
        };
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 2);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let q = PageQuery {
            page: Some(u64::MAX),
            limit: Some(10),
        };
        assert_eq!(q.offset(), i64::MAX as u64);
        assert_eq!(Pagination::new(&q, 3).page, u64::MAX);

        let q = PageQuery {
            page: Some(u64::MAX / 10),
            limit: Some(MAX_PAGE_LIMIT),
        };
        assert_eq!(q.offset(), i64::MAX as u64);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let q = PageQuery {
            page: Some(1),
            limit: Some(10),
        };
        assert_eq!(Pagination::new(&q, 0).total_pages, 0);
        assert_eq!(Pagination::new(&q, 10).total_pages, 1);
        assert_eq!(Pagination::new(&q, 11).total_pages, 2);
    }
}

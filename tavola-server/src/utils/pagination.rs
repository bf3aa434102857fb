//! Pagination envelope
//!
//! Every listing endpoint shares the same query parameters and response
//! shape: `page`/`pageSize` in, `{records, Pagination: {...}}` out.
//! Counts always run with the same filters as the SELECT, minus
//! LIMIT/OFFSET.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// `?page=&pageSize=` query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size", rename = "pageSize")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageQuery {
    /// Build from optional query parameters (listing endpoints that
    /// carry their own filter fields alongside page/pageSize)
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Clamp page to >= 1 and pageSize to 1..=MAX_PAGE_SIZE
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.normalized().page_size
    }

    pub fn offset(&self) -> i64 {
        let q = self.normalized();
        (q.page - 1) * q.page_size
    }
}

/// Pagination block returned alongside the records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    #[serde(rename = "recordsOnCurrentPage")]
    pub records_on_current_page: i64,
    #[serde(rename = "viewedRecords")]
    pub viewed_records: i64,
    #[serde(rename = "remainingRecords")]
    pub remaining_records: i64,
    pub total: i64,
}

impl Pagination {
    pub fn new(query: PageQuery, records_on_current_page: i64, total: i64) -> Self {
        let q = query.normalized();
        let viewed = (q.page - 1) * q.page_size + records_on_current_page;
        Self {
            current_page: q.page,
            records_on_current_page,
            viewed_records: viewed,
            remaining_records: (total - viewed).max(0),
            total,
        }
    }
}

/// Paginated listing response
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub records: Vec<T>,
    #[serde(rename = "Pagination")]
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(records: Vec<T>, query: PageQuery, total: i64) -> Self {
        let pagination = Pagination::new(query, records.len() as i64, total);
        Self {
            records,
            pagination,
        }
    }
}

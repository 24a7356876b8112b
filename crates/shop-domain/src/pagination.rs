//! Pagination types shared by every listing query.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i32 = 1;
pub const DEFAULT_PAGE_SIZE: i32 = 10;

/// Listing parameters as they arrive from clients.
///
/// - `page`: 1-based, defaults to 1 when ≤ 0
/// - `page_size`: defaults to 10 when ≤ 0
/// - `search`: optional substring filter, empty means no filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i32,
    pub page_size: i32,
    #[serde(default)]
    pub search: String,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            search: String::new(),
        }
    }
}

impl PageRequest {
    pub fn new(page: i32, page_size: i32, search: impl Into<String>) -> Self {
        Self {
            page,
            page_size,
            search: search.into(),
        }
        .normalized()
    }

    /// Replace non-positive `page` / `page_size` with their defaults and trim the search term.
    pub fn normalized(self) -> Self {
        Self {
            page: if self.page <= 0 { DEFAULT_PAGE } else { self.page },
            page_size: if self.page_size <= 0 {
                DEFAULT_PAGE_SIZE
            } else {
                self.page_size
            },
            search: self.search.trim().to_owned(),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page.max(1) as u64 - 1) * self.limit()
    }

    pub fn limit(&self) -> u64 {
        self.page_size.max(1) as u64
    }

    pub fn has_search(&self) -> bool {
        !self.search.is_empty()
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_records: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_records: 0,
        }
    }

    pub fn pagination(&self, request: &PageRequest) -> Pagination {
        Pagination::new(request, self.total_records)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_records: self.total_records,
        }
    }
}

/// Pagination block attached to every paginated envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: i32,
    pub page_size: i32,
    pub total_pages: i32,
    pub total_records: i32,
}

impl Pagination {
    pub fn new(request: &PageRequest, total_records: u64) -> Self {
        let page_size = request.page_size.max(1) as u64;
        let total_pages = total_records.div_ceil(page_size);
        Self {
            current_page: request.page,
            page_size: request.page_size,
            total_pages: i32::try_from(total_pages).unwrap_or(i32::MAX),
            total_records: i32::try_from(total_records).unwrap_or(i32::MAX),
        }
    }
}

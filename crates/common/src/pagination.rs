//! Page-number pagination for list endpoints

use serde::{Deserialize, Serialize};

use crate::Error;

/// Default page size for list endpoints
const DEFAULT_LIMIT: i64 = 15;

/// Smallest accepted page size
const MIN_LIMIT: i64 = 10;

/// Largest accepted page size
const MAX_LIMIT: i64 = 50;

/// Raw pagination query parameters. Out-of-range values are rejected, not
/// clamped, so callers get the same 400 the request schema produces elsewhere.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Apply defaults and bounds checks: `page ≥ 1` (default 1),
    /// `10 ≤ limit ≤ 50` (default 15).
    pub fn resolve(&self) -> Result<PageParams, Error> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(Error::Validation(
                "Page must be greater than or equal to 1".to_string(),
            ));
        }

        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(Error::Validation(format!(
                "Limit must be between {MIN_LIMIT} and {MAX_LIMIT}"
            )));
        }

        Ok(PageParams { page, limit })
    }
}

/// Validated page/limit pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    /// Row offset for the page query
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Build the response metadata block for a known total row count.
    pub fn meta(&self, total_items: i64) -> PageMeta {
        PageMeta::new(self.page, self.limit, total_items)
    }
}

/// Pagination metadata included in list responses.
///
/// `nextPage`/`previousPage` serialize as `null` when there is no such page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub next_page: Option<i64>,
    pub previous_page: Option<i64>,
}

impl PageMeta {
    pub fn new(page: i64, limit: i64, total_items: i64) -> Self {
        let total_pages = if limit > 0 {
            (total_items + limit - 1) / limit
        } else {
            0
        };
        let has_next_page = page < total_pages;
        let has_previous_page = page > 1;

        Self {
            page,
            limit,
            total_pages,
            total_items,
            has_next_page,
            has_previous_page,
            next_page: has_next_page.then(|| page + 1),
            previous_page: has_previous_page.then(|| page - 1),
        }
    }
}

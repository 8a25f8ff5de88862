use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{CODE_OK, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MESSAGE_OK};
use crate::shared::pagination::{page_markers, PageMarker, DEFAULT_SIBLING_COUNT};

/// Uniform response envelope.
///
/// `code` is `0` on success and negative on failure; clients branch on it
/// rather than on the HTTP status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Pagination details attached to list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct Meta {
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
    /// Pager markers: page numbers and `"..."` for collapsed gaps
    #[schema(value_type = Vec<serde_json::Value>)]
    pub pages: Vec<PageMarker>,
}

impl Meta {
    pub fn new(query: &PaginationQuery, total_items: i64) -> Self {
        let page_size = query.limit();
        let total_pages = if total_items <= 0 {
            0
        } else {
            (total_items + page_size - 1) / page_size
        };
        let page = query.page();

        Self {
            page,
            page_size,
            total_items,
            total_pages,
            pages: page_markers(page, total_pages, DEFAULT_SIBLING_COUNT),
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Standard pagination query parameters for all list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 50, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    /// Page number, with anything below 1 treated as the first page
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Calculate SQL OFFSET from page number
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Clamped page size; non-positive values fall back to the default
    pub fn limit(&self) -> i64 {
        if self.page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size.min(MAX_PAGE_SIZE)
        }
    }
}

/// A page of rows together with the unpaginated total.
#[derive(Debug)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Paginated<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            code: CODE_OK,
            message: message.unwrap_or_else(|| MESSAGE_OK.to_string()),
            data,
            meta,
            errors: None,
        }
    }

    /// Envelope for one page of a paginated listing.
    pub fn page(page: Paginated<T>, query: &PaginationQuery) -> ApiResponse<Vec<T>> {
        let meta = Meta::new(query, page.total);
        ApiResponse::success(Some(page.items), None, Some(meta))
    }

    pub fn error(code: i32, message: String, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            code,
            message,
            data: None,
            meta: None,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: i64, page_size: i64) -> PaginationQuery {
        PaginationQuery { page, page_size }
    }

    #[test]
    fn test_offset_and_limit() {
        assert_eq!(query(1, 20).offset(), 0);
        assert_eq!(query(3, 20).offset(), 40);
        assert_eq!(query(0, 20).offset(), 0);
        assert_eq!(query(-4, 20).page(), 1);
    }

    #[test]
    fn test_limit_falls_back_and_clamps() {
        assert_eq!(query(1, 0).limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(query(1, -3).limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(query(1, 10_000).limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_meta_rounds_total_pages_up() {
        let meta = Meta::new(&query(2, 10), 95);
        assert_eq!(meta.total_pages, 10);
        assert_eq!(meta.page, 2);
        assert_eq!(meta.pages.first(), Some(&PageMarker::Page(1)));
        assert_eq!(meta.pages.last(), Some(&PageMarker::Page(10)));
    }

    #[test]
    fn test_meta_for_empty_listing() {
        let meta = Meta::new(&query(1, 10), 0);
        assert_eq!(meta.total_pages, 0);
        assert!(meta.pages.is_empty());
    }

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success(Some(7), None, None)).unwrap();
        assert_eq!(body["code"], 0);
        assert_eq!(body["message"], "ok");
        assert_eq!(body["data"], 7);
        assert!(body.get("meta").is_none());
    }
}

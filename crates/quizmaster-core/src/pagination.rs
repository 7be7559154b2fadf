//! Pagination utilities for list endpoints.
//!
//! Admin listings are page-based:
//! - `limit`: Items per page (1-100, endpoint-specific default)
//! - `page`: Page number (1-indexed, default: 1)
//!
//! # Example
//!
//! ```ignore
//! use quizmaster_core::pagination::{PaginationMeta, PaginationParams};
//!
//! let limit = params.limit_or(20);
//! let offset = params.offset_for(limit);
//! let users = fetch_users(limit, offset).await?;
//! let meta = PaginationMeta::new(total, params.page(), limit);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::serde::deserialize_optional_i64;

pub const MAX_LIMIT: i64 = 100;

/// Metadata about a paginated response.
///
/// ```json
/// { "page": 2, "limit": 20, "total": 45, "total_pages": 3, "has_more": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Maximum items per page (the limit that was applied)
    pub limit: i64,
    /// Total number of items across all pages
    pub total: i64,
    /// Number of pages for the given limit
    pub total_pages: i64,
    /// Whether there are more items after this page
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let limit = limit.max(1);
        let total_pages = (total + limit - 1) / limit;
        Self {
            page,
            limit,
            total,
            total_pages,
            has_more: page.saturating_mul(limit) < total,
        }
    }
}

/// Query parameters for page-based pagination.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Items per page (1-100)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl PaginationParams {
    /// Returns the effective limit clamped to [1, 100], using `default` when unset.
    #[must_use]
    pub fn limit_or(&self, default: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, MAX_LIMIT)
    }

    /// Returns the page number, clamped to a minimum of 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Number of rows to skip for the current page. Saturates for huge pages.
    #[must_use]
    pub fn offset_for(&self, limit: i64) -> i64 {
        (self.page() - 1).saturating_mul(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_default() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit_or(20), 20);
        assert_eq!(params.offset_for(20), 0);
    }

    #[test]
    fn test_pagination_params_custom_values() {
        let params = PaginationParams {
            limit: Some(25),
            page: Some(3),
        };
        assert_eq!(params.limit_or(20), 25);
        assert_eq!(params.offset_for(25), 50);
    }

    #[test]
    fn test_pagination_params_limit_boundaries() {
        let zero = PaginationParams {
            limit: Some(0),
            page: None,
        };
        assert_eq!(zero.limit_or(50), 1);

        let huge = PaginationParams {
            limit: Some(150),
            page: None,
        };
        assert_eq!(huge.limit_or(50), 100);

        let negative = PaginationParams {
            limit: Some(-10),
            page: None,
        };
        assert_eq!(negative.limit_or(50), 1);
    }

    #[test]
    fn test_pagination_params_page_negative() {
        let params = PaginationParams {
            limit: Some(10),
            page: Some(-5),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset_for(10), 0);
    }

    #[test]
    fn test_pagination_huge_page_does_not_overflow() {
        let params = PaginationParams {
            limit: Some(100),
            page: Some(i64::MAX),
        };
        let limit = params.limit_or(20);
        assert_eq!(params.offset_for(limit), i64::MAX);

        let meta = PaginationMeta::new(45, params.page(), limit);
        assert_eq!(meta.page, i64::MAX);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_deserialize_empty_strings_as_none() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"limit": "", "page": "4"}"#).unwrap();
        assert_eq!(params.limit, None);
        assert_eq!(params.page, Some(4));
    }

    #[test]
    fn test_pagination_meta_total_pages() {
        let meta = PaginationMeta::new(45, 1, 20);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_more);

        let last = PaginationMeta::new(45, 3, 20);
        assert!(!last.has_more);

        let empty = PaginationMeta::new(0, 1, 20);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_more);
    }
}

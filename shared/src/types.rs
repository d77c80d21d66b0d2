//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Default page size for listings
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Build from raw query values; missing or non-positive values fall back
    /// to page 1 and `default_limit`
    pub fn from_query(page: Option<i64>, limit: Option<i64>, default_limit: u32) -> Self {
        let page = page
            .filter(|p| *p >= 1)
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .and_then(|l| u32::try_from(l).ok())
            .unwrap_or(default_limit.max(1));
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.limit) * (i64::from(self.page) - 1)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

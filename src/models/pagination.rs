//! Fixed-size pagination for class and entry listings

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Rows per page for every listing
pub const PAGE_SIZE: i64 = 5;

/// Zero-indexed page number, validated before any query runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Page(u32);

impl Page {
    /// Parse the `page` query parameter.
    ///
    /// - Missing or blank means the first page
    /// - Negative or non-numeric values are rejected
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(Self(0)),
            Some(raw) => raw,
        };
        let number: i64 = raw.parse().map_err(|_| ValidationError::InvalidFormat {
            field: "page number",
            reason: "must be a whole number",
        })?;
        if number < 0 {
            return Err(ValidationError::InvalidFormat {
                field: "page number",
                reason: "cannot be negative",
            });
        }
        u32::try_from(number)
            .map(Self)
            .map_err(|_| ValidationError::OutOfRange {
                field: "page number",
                min: 0,
                max: u32::MAX as i64,
            })
    }

    pub fn number(self) -> u32 {
        self.0
    }

    pub fn offset(self) -> Offset {
        Offset(self.0 as i64 * PAGE_SIZE)
    }

    /// Whether this page holds any of `total` rows. The first page always exists.
    pub fn exists_within(self, total: i64) -> bool {
        self.0 == 0 || self.offset().value() < total
    }
}

/// SQL OFFSET; always a non-negative multiple of [`PAGE_SIZE`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset(i64);

impl Offset {
    pub fn value(self) -> i64 {
        self.0
    }
}

/// Query parameters for pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    /// Current page number
    pub page: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: Page) -> Self {
        let next = Page(page.0.saturating_add(1));
        Self {
            items,
            total,
            page: page.0,
            has_next: next.offset().value() < total,
            has_prev: page.0 > 0,
        }
    }
}

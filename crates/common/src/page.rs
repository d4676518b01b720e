//! Pagination window for association accessors.

use serde::Deserialize;

/// Default number of entries returned when `first` is unspecified.
pub const DEFAULT_FIRST: u64 = 10;

/// Upper bound on `first`; larger requests are clamped.
pub const MAX_FIRST: u64 = 100;

/// A `first`/`offset` pagination window.
///
/// Both fields are optional on the wire; [`Page::limit`] and
/// [`Page::offset`] apply the defaults (`first = 10`, `offset = 0`).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Maximum number of entries to return.
    pub first: Option<u64>,
    /// Number of entries to skip.
    pub offset: Option<u64>,
}

impl Page {
    /// Create a page with explicit values.
    #[must_use]
    pub const fn new(first: u64, offset: u64) -> Self {
        Self {
            first: Some(first),
            offset: Some(offset),
        }
    }

    /// Effective limit, defaulting to [`DEFAULT_FIRST`] and clamped to
    /// [`MAX_FIRST`].
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.first.unwrap_or(DEFAULT_FIRST).min(MAX_FIRST)
    }

    /// Effective offset, defaulting to 0.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = Page::default();
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_explicit_values() {
        let page = Page::new(3, 2);
        assert_eq!(page.limit(), 3);
        assert_eq!(page.offset(), 2);
    }

    #[test]
    fn test_limit_is_clamped() {
        let page = Page::new(10_000, 0);
        assert_eq!(page.limit(), MAX_FIRST);
    }

    #[test]
    fn test_partial_window() {
        let page = Page {
            first: None,
            offset: Some(5),
        };
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 5);
    }
}

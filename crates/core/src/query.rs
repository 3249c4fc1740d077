//! Query parameter parsing and the document-store query vocabulary.
//!
//! [`QuerySpec::parse`] is a total function: every combination of query
//! parameters yields a spec, with malformed numbers falling back to defaults.
//! The spec is then lowered into a [`Filter`] and [`FindOptions`], which store
//! backends execute.
//!
//! # Recognized parameters
//!
//! | Parameter   | Effect                                                    |
//! |-------------|-----------------------------------------------------------|
//! | `brand`     | Case-insensitive pattern matched against the brand field  |
//! | `sortField` | Field to sort by; no sort when absent or empty             |
//! | `sortOrder` | `desc` sorts descending; anything else ascends             |
//! | `limit`     | Page size, default 10, no upper bound                      |
//! | `page`      | 1-based page number, default 1, not clamped                |

use std::collections::HashMap;

use crate::types::Price;

/// Page number used when `page` is absent or unparsable.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when `limit` is absent or unparsable.
pub const DEFAULT_LIMIT: i64 = 10;

/// Which documents a store operation applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    /// Every document in the collection.
    #[default]
    All,
    /// Documents whose `brand` matches the pattern, ignoring case.
    ///
    /// The pattern is a regular expression, so a plain word behaves as a
    /// case-insensitive substring search.
    BrandMatches(String),
    /// Documents whose `brand` is exactly this value.
    BrandEquals(String),
}

/// Sort direction for a [`SortSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Returns true for [`SortDirection::Descending`].
    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Descending)
    }
}

/// Sort by a single document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Sort, skip and limit for a `find` call.
///
/// Values are signed so that out-of-range input reaches the store untouched:
/// - `skip` below zero is rejected by the store.
/// - `limit == 0` means "no limit"; a negative limit counts as its absolute value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FindOptions {
    pub sort: Option<SortSpec>,
    pub skip: i64,
    pub limit: i64,
}

impl FindOptions {
    /// Natural order, no skip, no limit.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// A modification applied by `update_one`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// Set the `price` field, creating it if absent.
    SetPrice(Price),
}

/// A validated listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub filter_text: Option<String>,
    pub sort_field: Option<String>,
    pub sort_descending: bool,
    pub page: i64,
    pub limit: i64,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            filter_text: None,
            sort_field: None,
            sort_descending: false,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl QuerySpec {
    /// Parse raw query parameters. Never fails.
    #[must_use]
    pub fn parse(params: &HashMap<String, String>) -> Self {
        let non_empty = |key: &str| {
            params
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
        };

        Self {
            filter_text: non_empty("brand"),
            sort_field: non_empty("sortField"),
            sort_descending: params.get("sortOrder").is_some_and(|order| order == "desc"),
            page: params
                .get("page")
                .and_then(|raw| parse_leading_int(raw))
                .unwrap_or(DEFAULT_PAGE),
            limit: params
                .get("limit")
                .and_then(|raw| parse_leading_int(raw))
                .unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// The brand filter, or [`Filter::All`] when no text was given.
    #[must_use]
    pub fn filter(&self) -> Filter {
        self.filter_text
            .as_ref()
            .map_or(Filter::All, |text| Filter::BrandMatches(text.clone()))
    }

    /// The requested sort, if any.
    #[must_use]
    pub fn sort(&self) -> Option<SortSpec> {
        self.sort_field.as_ref().map(|field| SortSpec {
            field: field.clone(),
            direction: if self.sort_descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        })
    }

    /// Number of documents to skip: `(page - 1) * limit`.
    ///
    /// Negative when `page <= 0`; the value is passed to the store as-is.
    #[must_use]
    pub const fn skip(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Sort, skip and limit for the store call.
    #[must_use]
    pub fn find_options(&self) -> FindOptions {
        FindOptions {
            sort: self.sort(),
            skip: self.skip(),
            limit: self.limit,
        }
    }
}

/// Read a leading decimal integer, the way `%d` scanning does.
///
/// Leading whitespace and a single sign are accepted, and scanning stops at the
/// first non-digit, so `"20abc"` reads as 20. Returns `None` when no digits are
/// present or the number does not fit in an `i64`.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = trimmed.strip_prefix('-').map_or_else(
        || (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        |rest| (true, rest),
    );

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = rest.get(..digits_end)?;
    if digits.is_empty() {
        return None;
    }

    let magnitude: i64 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

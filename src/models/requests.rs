//! Request parameters for the proxy API
//!
//! Each NEO endpoint reads its inputs from the [`RequestContext`] handed to
//! the cached handler.

use serde::Deserialize;

use crate::cache::RequestContext;

/// Browse page used when `page` is absent
pub const DEFAULT_BROWSE_PAGE: i64 = 0;

/// Browse page size used when `size` is absent
pub const DEFAULT_BROWSE_SIZE: i64 = 20;

/// Query for GET /neo/feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedParams {
    pub start_date: String,
    pub end_date: String,
}

impl FeedParams {
    /// Both dates must be present and non-empty.
    pub fn from_context(ctx: &RequestContext) -> Option<Self> {
        let start_date = ctx.query_param("start_date").filter(|s| !s.is_empty())?;
        let end_date = ctx.query_param("end_date").filter(|s| !s.is_empty())?;
        Some(Self {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        })
    }
}

/// Query for GET /neo/browse
///
/// A value of 0 means "leave it out of the upstream query".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrowseParams {
    pub page: i64,
    pub size: i64,
}

impl BrowseParams {
    /// Absent values take their defaults. Present values are read with
    /// [`leading_int`]; one without a leading number becomes 0.
    pub fn from_context(ctx: &RequestContext) -> Self {
        let read = |name: &str, default: i64| {
            ctx.query_param(name)
                .map_or(default, |raw| leading_int(raw).unwrap_or(0))
        };
        Self {
            page: read("page", DEFAULT_BROWSE_PAGE),
            size: read("size", DEFAULT_BROWSE_SIZE),
        }
    }
}

/// Path parameter for GET /neo/lookup/:id
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupParams {
    pub id: i64,
}

impl LookupParams {
    /// `None` when the id does not start with a number.
    pub fn from_context(ctx: &RequestContext) -> Option<Self> {
        let id = leading_int(ctx.path_param("id")?)?;
        Some(Self { id })
    }
}

/// Reads the integer at the start of `raw`.
///
/// Leading whitespace and one sign character are accepted and reading
/// stops at the first non-digit, so `"12abc"` is 12. Returns `None` when
/// no digit follows or the number does not fit in an `i64`.
pub fn leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Query for the cache admin endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct CacheKeyQuery {
    #[serde(default)]
    pub key: Option<String>,
}

impl CacheKeyQuery {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.key.as_deref() {
            None | Some("") => Some("key is required".to_string()),
            Some(_) => None,
        }
    }
}

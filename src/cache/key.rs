//! Request Descriptor and Key Generation
//!
//! A [`RequestContext`] is everything a wrapped handler (and its key
//! generator) gets to see about an inbound request.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::extract::Query;
use axum::http::{HeaderMap, Uri};

/// Prefix applied by the default key generator.
pub const DEFAULT_KEY_PREFIX: &str = "cache:";

// == Request Context ==
/// Transport-agnostic description of an inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    uri: Uri,
    headers: HeaderMap,
    query: HashMap<String, String>,
    path_params: HashMap<String, String>,
}

impl RequestContext {
    /// Builds a context from the request URI and headers.
    ///
    /// Query parameters are decoded eagerly. A query string that fails to
    /// decode yields no parameters; the raw string is still part of the URI.
    pub fn new(uri: Uri, headers: HeaderMap) -> Self {
        let query = Query::<HashMap<String, String>>::try_from_uri(&uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        Self {
            uri,
            headers,
            query,
            path_params: HashMap::new(),
        }
    }

    /// Test constructor from a path-and-query string such as
    /// `/neo/browse?page=1`.
    #[cfg(test)]
    pub(crate) fn from_path(path_and_query: &str) -> Self {
        let uri = path_and_query
            .parse()
            .unwrap_or_else(|err| panic!("invalid test URI {path_and_query:?}: {err}"));
        Self::new(uri, HeaderMap::new())
    }

    /// Attaches a matched route parameter (e.g. `id` for `/lookup/:id`).
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Path plus verbatim query string, e.g. `/neo/browse?page=0`.
    pub fn path_and_query(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| self.uri.path())
    }

    /// Decoded query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Route parameter by name.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }
}

// == Key Generator ==
/// Maps a request to its cache key.
///
/// Any `Fn(&RequestContext) -> String` closure can be used; distinct logical
/// requests must produce distinct keys.
#[derive(Clone)]
pub struct KeyGenerator(Arc<dyn Fn(&RequestContext) -> String + Send + Sync>);

impl KeyGenerator {
    pub fn new<F>(generate: F) -> Self
    where
        F: Fn(&RequestContext) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(generate))
    }

    pub fn generate(&self, request: &RequestContext) -> String {
        (self.0)(request)
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(default_key)
    }
}

impl fmt::Debug for KeyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyGenerator(..)")
    }
}

/// `"cache:"` followed by the verbatim path and query string.
pub fn default_key(request: &RequestContext) -> String {
    format!("{}{}", DEFAULT_KEY_PREFIX, request.path_and_query())
}

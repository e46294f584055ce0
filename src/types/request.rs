//! Query request value type

use serde::{Deserialize, Serialize};

/// Per-request caching options.
///
/// Carried on the request rather than in ambient state so that decorated
/// key generators and policies can act on a single call without global
/// configuration changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheOptions {
    /// Skip the cache entirely for this call (the default policy declines
    /// both lookup and store).
    #[serde(default)]
    pub no_cache: bool,

    /// Optional key namespace. When set, [`ScopedKeyGenerator`] prefixes
    /// the generated key with it, isolating this call's entries from the
    /// shared namespace.
    ///
    /// [`ScopedKeyGenerator`]: crate::cache::ScopedKeyGenerator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// An immutable time-ranged query.
///
/// `start` and `end` are millisecond timestamps, `step` is the sampling
/// interval in milliseconds. `start == end` is the valid zero-width case
/// (an instant query); for ranged requests `step >= 1` is a precondition
/// because gap tolerance and freshness rounding divide by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub start: i64,
    pub end: i64,
    pub step: i64,
    pub query: String,
    #[serde(default)]
    pub options: CacheOptions,
}

impl QueryRequest {
    /// Create a ranged request over `[start, end]` with the given step.
    pub fn new(query: impl Into<String>, start: i64, end: i64, step: i64) -> Self {
        Self {
            start,
            end,
            step,
            query: query.into(),
            options: CacheOptions::default(),
        }
    }

    /// Create an instant request at a single timestamp.
    pub fn instant(query: impl Into<String>, ts: i64) -> Self {
        Self {
            start: ts,
            end: ts,
            step: 0,
            query: query.into(),
            options: CacheOptions::default(),
        }
    }

    /// Set caching options.
    pub fn with_options(mut self, options: CacheOptions) -> Self {
        self.options = options;
        self
    }

    /// Clone this request with a different `[start, end]` range.
    ///
    /// Everything else (query, step, options) is carried over unchanged.
    pub fn with_range(&self, start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }

    /// Whether this is a zero-width instant query.
    pub fn is_instant(&self) -> bool {
        self.start == self.end
    }
}

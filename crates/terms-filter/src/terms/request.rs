//! The collected, not yet compiled, terms filter request.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::FilterResult;
use super::strategy::ExecutionMode;

/// The execution value used when the body has no `execution` key.
pub const DEFAULT_EXECUTION: &str = "plain";

/// An explicit cache identity for a compiled filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates a cache key from its text.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller override of a strategy's default final-node caching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheOverride {
    /// No `_cache` key; the strategy decides.
    #[default]
    Unset,
    /// `_cache: true`.
    ForceOn,
    /// `_cache: false`.
    ForceOff,
}

impl CacheOverride {
    /// Resolves the override against a strategy default.
    pub fn resolve(self, default: bool) -> bool {
        match self {
            CacheOverride::Unset => default,
            CacheOverride::ForceOn => true,
            CacheOverride::ForceOff => false,
        }
    }
}

impl From<bool> for CacheOverride {
    fn from(value: bool) -> Self {
        if value {
            CacheOverride::ForceOn
        } else {
            CacheOverride::ForceOff
        }
    }
}

/// A terms filter request, collected from a filter body.
///
/// Built once per compilation and consumed by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    /// The key of the terms array.
    pub field_name: String,
    /// Raw term texts, in document order.
    pub terms: Vec<String>,
    /// Raw `execution` text. Validated when the strategy is looked up.
    pub execution: String,
    /// `_name`, if given.
    pub filter_name: Option<String>,
    /// `_cache`, if given.
    pub cache: CacheOverride,
    /// `_cache_key` or `_cacheKey`, if given.
    pub cache_key: Option<CacheKey>,
}

impl FilterRequest {
    /// Creates a request for `field_name` with default options.
    pub fn new(field_name: impl Into<String>, terms: Vec<String>) -> Self {
        Self {
            field_name: field_name.into(),
            terms,
            execution: DEFAULT_EXECUTION.to_string(),
            filter_name: None,
            cache: CacheOverride::Unset,
            cache_key: None,
        }
    }

    /// Sets the raw execution value.
    pub fn with_execution(mut self, execution: impl Into<String>) -> Self {
        self.execution = execution.into();
        self
    }

    /// Sets the cache override.
    pub fn with_cache(mut self, cache: CacheOverride) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the explicit cache key.
    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(CacheKey::new(key));
        self
    }

    /// Sets the filter name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.filter_name = Some(name.into());
        self
    }

    /// Resolves the raw execution text to a mode.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::UnsupportedExecutionMode` naming the value if it
    /// is not a known mode.
    pub fn mode(&self) -> FilterResult<ExecutionMode> {
        self.execution.parse()
    }
}

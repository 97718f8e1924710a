//! Filter caches.
//!
//! The compiler hands sub-filters to a [`FilterCache`] according to the
//! execution strategy. A cache wraps the node in [`FilterNode::Cached`] and
//! may return a previously stored, equivalent tree instead of the one it was
//! given.
//!
//! Two implementations are provided:
//! - [`InMemoryFilterCache`] - memoizes by explicit key or by structure
//! - [`PassThroughCache`] - wraps without memoizing

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::terms::{CacheKey, FilterNode};

/// A filter cache collaborator.
///
/// Implementations must be safe to share between threads compiling
/// independent requests.
pub trait FilterCache: Send + Sync {
    /// Wraps `filter` for caching, keyed by `key` when given and by the
    /// filter's structure otherwise.
    ///
    /// The returned node is always a [`FilterNode::Cached`].
    fn cache_filter(&self, filter: FilterNode, key: Option<&CacheKey>) -> FilterNode;
}

/// Counters for an [`InMemoryFilterCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a stored filter.
    pub hits: u64,
    /// Lookups that stored a new filter.
    pub misses: u64,
    /// Filters currently stored.
    pub entries: usize,
}

/// Identity of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Slot {
    Key(CacheKey),
    Structure(Arc<FilterNode>),
}

/// A thread-safe, in-process filter cache.
///
/// Filters given an explicit key are stored under that key; a later filter
/// with the same key gets the stored tree back, whatever its structure.
/// Filters without a key are stored under their own structure, so two
/// structurally equal filters share one tree.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use terms_filter_rs::{FilterCache, FilterNode, InMemoryFilterCache};
///
/// let cache = InMemoryFilterCache::new();
/// let first = cache.cache_filter(FilterNode::term("status", "active"), None);
/// let second = cache.cache_filter(FilterNode::term("status", "active"), None);
///
/// match (&first, &second) {
///     (FilterNode::Cached { inner: a, .. }, FilterNode::Cached { inner: b, .. }) => {
///         assert!(Arc::ptr_eq(a, b));
///     }
///     _ => unreachable!(),
/// }
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryFilterCache {
    entries: Mutex<HashMap<Slot, Arc<FilterNode>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryFilterCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.lock().len(),
        }
    }

    /// Removes every stored filter and resets the counters.
    pub fn clear(&self) {
        self.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Slot, Arc<FilterNode>>> {
        // Entries are inserted whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FilterCache for InMemoryFilterCache {
    fn cache_filter(&self, filter: FilterNode, key: Option<&CacheKey>) -> FilterNode {
        let filter = Arc::new(filter);
        let slot = match key {
            Some(key) => Slot::Key(key.clone()),
            None => Slot::Structure(Arc::clone(&filter)),
        };

        let inner = match self.lock().entry(slot) {
            Entry::Occupied(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key = ?key, "filter cache hit");
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key = ?key, "filter cache miss");
                Arc::clone(entry.insert(filter))
            }
        };

        FilterNode::cached(inner, key.cloned())
    }
}

/// A cache that wraps filters without storing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughCache;

impl FilterCache for PassThroughCache {
    fn cache_filter(&self, filter: FilterNode, key: Option<&CacheKey>) -> FilterNode {
        FilterNode::cached(Arc::new(filter), key.cloned())
    }
}

//! Per-call parse context.

use std::collections::BTreeMap;
use std::fmt;

use crate::cache::FilterCache;
use crate::mapping::FieldResolver;
use crate::terms::FilterNode;

/// Collaborators and named filters for one query compilation.
///
/// A context borrows the shared resolver and cache and owns the named-filter
/// table that `_name` options register into. Create one per compilation.
pub struct ParseContext<'a> {
    resolver: &'a dyn FieldResolver,
    cache: &'a dyn FilterCache,
    named_filters: BTreeMap<String, FilterNode>,
}

impl fmt::Debug for ParseContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseContext")
            .field("named_filters", &self.named_filters.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<'a> ParseContext<'a> {
    /// Creates a context over `resolver` and `cache`.
    pub fn new(resolver: &'a dyn FieldResolver, cache: &'a dyn FilterCache) -> Self {
        Self {
            resolver,
            cache,
            named_filters: BTreeMap::new(),
        }
    }

    /// Returns the field resolver.
    pub fn resolver(&self) -> &'a dyn FieldResolver {
        self.resolver
    }

    /// Returns the filter cache.
    pub fn cache(&self) -> &'a dyn FilterCache {
        self.cache
    }

    /// Registers `filter` under `name`, replacing any earlier filter with
    /// that name.
    pub fn add_named_filter(&mut self, name: impl Into<String>, filter: FilterNode) {
        let name = name.into();
        tracing::debug!(name = %name, "registered named filter");
        self.named_filters.insert(name, filter);
    }

    /// Returns the filter registered under `name`.
    pub fn named_filter(&self, name: &str) -> Option<&FilterNode> {
        self.named_filters.get(name)
    }

    /// Returns every named filter, ordered by name.
    pub fn named_filters(&self) -> &BTreeMap<String, FilterNode> {
        &self.named_filters
    }

    /// Consumes the context, returning its named filters.
    pub fn into_named_filters(self) -> BTreeMap<String, FilterNode> {
        self.named_filters
    }
}

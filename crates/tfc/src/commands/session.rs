//! Compilation state shared by the compile and match commands.
//!
//! A [`Session`] owns the field resolver, the filter cache and the parser
//! registry for one invocation. Every filter compiled through it shares the
//! same cache, so repeated sub-filters are memoized across documents.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use terms_filter_rs::{
    index_document, CacheStats, Document, FilterCache, FilterNode, FilterParserRegistry,
    InMemoryFilterCache, MappingConfig, MappingResolver, ParseContext, PassThroughCache,
};

use super::config::load_config;
use super::{CommandContext, CommandError, Result};

/// The cache a session compiles against.
#[derive(Debug)]
enum SessionCache {
    Memory(InMemoryFilterCache),
    PassThrough(PassThroughCache),
}

impl SessionCache {
    fn as_filter_cache(&self) -> &dyn FilterCache {
        match self {
            Self::Memory(cache) => cache,
            Self::PassThrough(cache) => cache,
        }
    }
}

/// Filters compiled from one input.
#[derive(Debug)]
pub struct Compiled {
    /// Compiled filters in input order.
    pub filters: Vec<FilterNode>,
    /// Filters registered through `_name`.
    pub named: BTreeMap<String, FilterNode>,
}

/// Resolver, cache and registry for one invocation.
#[derive(Debug)]
pub struct Session {
    resolver: MappingResolver,
    cache: SessionCache,
    registry: FilterParserRegistry,
    color: bool,
}

impl Session {
    /// Creates a session over `mapping`, memoizing filters when `cache_enabled`.
    pub fn new(mapping: MappingConfig, cache_enabled: bool) -> Self {
        let cache = if cache_enabled {
            SessionCache::Memory(InMemoryFilterCache::new())
        } else {
            SessionCache::PassThrough(PassThroughCache)
        };

        Self {
            resolver: MappingResolver::new(mapping),
            cache,
            registry: FilterParserRegistry::default(),
            color: true,
        }
    }

    /// Builds a session from the config file and the `--mapping` override.
    pub fn load(ctx: &CommandContext) -> Result<Self> {
        let config = load_config()?;

        let mapping = match &ctx.mapping {
            Some(path) => load_mapping_file(path)?,
            None => config.mapping,
        };
        tracing::debug!(
            fields = mapping.fields.len(),
            doc_types = mapping.doc_types.len(),
            cache = config.cache.is_enabled(),
            "loaded field mappings"
        );

        let mut session = Self::new(mapping, config.cache.is_enabled());
        session.color = config.output.color.unwrap_or(true);
        Ok(session)
    }

    /// Whether the config allows colored output.
    pub fn color_enabled(&self) -> bool {
        self.color
    }

    /// Compiles a filter document, or an array of them, in one parse context.
    ///
    /// # Errors
    ///
    /// Fails on the first filter that does not compile, or with
    /// `CommandError::Input` if an array holds no filters.
    pub fn compile(&self, input: &Value) -> Result<Compiled> {
        let documents = match input {
            Value::Array(items) if items.is_empty() => {
                return Err(CommandError::Input("no filters to compile".to_string()))
            }
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut ctx = ParseContext::new(&self.resolver, self.cache.as_filter_cache());
        let filters = documents
            .into_iter()
            .map(|document| self.registry.parse_filter(&mut ctx, document))
            .collect::<terms_filter_rs::FilterResult<Vec<_>>>()?;

        Ok(Compiled {
            filters,
            named: ctx.into_named_filters(),
        })
    }

    /// Indexes a JSON array of documents, or a single document, through the
    /// session's mappings.
    pub fn index_documents(&self, input: &Value) -> Result<Vec<Document>> {
        match input {
            Value::Array(items) => items
                .iter()
                .map(|item| index_document(&self.resolver, item).map_err(CommandError::from))
                .collect(),
            other => Ok(vec![index_document(&self.resolver, other)?]),
        }
    }

    /// Returns the cache counters, if the session memoizes filters.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        match &self.cache {
            SessionCache::Memory(cache) => Some(cache.stats()),
            SessionCache::PassThrough(_) => None,
        }
    }
}

/// Loads a standalone mapping file.
pub fn load_mapping_file(path: &Path) -> Result<MappingConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        CommandError::Config(format!("Failed to read mapping {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        CommandError::Config(format!("Failed to parse mapping {}: {}", path.display(), e))
    })
}

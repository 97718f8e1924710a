//! Terms filter compiler.
//!
//! This crate compiles declarative "field has any of these terms" filters
//! into boolean filter trees, choosing among five execution strategies that
//! differ in how per-term matches are combined and which parts of the tree
//! go through a filter cache.
//!
//! The compiler core lives in [`terms`]. The collaborators it consumes are
//! traits with in-process implementations:
//!
//! - [`FieldResolver`] - field name and value mapping ([`MappingResolver`], [`NoMappings`])
//! - [`FilterCache`] - filter memoization ([`InMemoryFilterCache`], [`PassThroughCache`])
//! - [`ParseContext`] - per-call collaborators and named filters
//! - [`FilterEvaluator`] - runs compiled trees against [`Document`]s

pub mod cache;
pub mod context;
pub mod evaluator;
pub mod mapping;
pub mod terms;

pub use cache::{CacheStats, FilterCache, InMemoryFilterCache, PassThroughCache};
pub use context::ParseContext;
pub use evaluator::{Document, FilterEvaluator};
pub use mapping::{
    index_document, FieldMapping, FieldResolver, FieldType, MappingConfig, MappingResolver,
    NoMappings, ResolvedField, ValueEncoder,
};
pub use terms::{
    ArgumentCollector, CacheKey, CacheOverride, ExecutionMode, FilterError, FilterNode,
    FilterParser, FilterParserRegistry, FilterRequest, FilterResult, JsonTokens, Scalar, Strategy,
    TermsFilterParser, Token, TokenStream,
};

//! Filter parsers and the registry that dispatches to them by name.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::assembler::assemble;
use super::collector::ArgumentCollector;
use super::error::{FilterError, FilterResult};
use super::node::FilterNode;
use super::request::FilterRequest;
use super::token::{kind_of, JsonTokens, TokenStream};
use crate::context::ParseContext;
use crate::mapping::ResolvedField;

/// A parser for one kind of filter body.
pub trait FilterParser: Send + Sync {
    /// Top-level names this parser answers to.
    fn names(&self) -> &'static [&'static str];

    /// Parses a filter body and returns its compiled node.
    ///
    /// `tokens` is positioned just inside the body's opening `{`.
    fn parse(
        &self,
        ctx: &mut ParseContext<'_>,
        tokens: &mut dyn TokenStream,
    ) -> FilterResult<FilterNode>;
}

/// Names of the terms filter.
const TERMS_NAMES: &[&str] = &[TermsFilterParser::NAME, "in"];

/// Parser for `terms` (alias `in`) filters.
///
/// # Example
///
/// ```
/// use terms_filter_rs::{
///     FilterNode, FilterParser, InMemoryFilterCache, JsonTokens, NoMappings, ParseContext,
///     TermsFilterParser,
/// };
///
/// let cache = InMemoryFilterCache::new();
/// let mut ctx = ParseContext::new(&NoMappings, &cache);
/// let mut tokens = JsonTokens::parse_body(r#"{"status": ["active"], "_cache": false}"#).unwrap();
///
/// let filter = TermsFilterParser.parse(&mut ctx, &mut tokens).unwrap();
/// assert_eq!(filter, FilterNode::terms("status", vec!["active".to_string()]));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TermsFilterParser;

impl TermsFilterParser {
    /// Primary name.
    pub const NAME: &'static str = "terms";

    /// Compiles an already collected request.
    ///
    /// Resolves the field, assembles the tree, applies the resolver's wrapping
    /// and registers the result under the request's `_name`, if any.
    pub fn compile(
        &self,
        ctx: &mut ParseContext<'_>,
        request: FilterRequest,
    ) -> FilterResult<FilterNode> {
        let resolved = ctx.resolver().resolve(&request.field_name);
        let field = match &resolved {
            Some(field) => field.clone(),
            None => ResolvedField::new(&request.field_name),
        };
        let filter_name = request.filter_name.clone();

        let filter = assemble(request, &field, ctx.cache())?;
        let filter = ctx.resolver().wrap(filter, resolved.as_ref());

        if let Some(name) = filter_name {
            ctx.add_named_filter(name, filter.clone());
        }
        Ok(filter)
    }
}

impl FilterParser for TermsFilterParser {
    fn names(&self) -> &'static [&'static str] {
        TERMS_NAMES
    }

    fn parse(
        &self,
        ctx: &mut ParseContext<'_>,
        tokens: &mut dyn TokenStream,
    ) -> FilterResult<FilterNode> {
        let request = ArgumentCollector::collect(tokens)?;
        self.compile(ctx, request)
    }
}

/// Dispatches top-level filter documents to parsers by name.
///
/// The default registry knows the terms parser under `terms` and `in`.
///
/// # Example
///
/// ```
/// use terms_filter_rs::{FilterParserRegistry, InMemoryFilterCache, NoMappings, ParseContext};
///
/// let registry = FilterParserRegistry::default();
/// let cache = InMemoryFilterCache::new();
/// let mut ctx = ParseContext::new(&NoMappings, &cache);
///
/// let filter = registry
///     .parse_str(&mut ctx, r#"{"in": {"status": ["a", "b"], "execution": "bool"}}"#)
///     .unwrap();
/// assert_eq!(filter.children().len(), 2);
/// ```
#[derive(Clone)]
pub struct FilterParserRegistry {
    parsers: HashMap<&'static str, Arc<dyn FilterParser>>,
}

impl Default for FilterParserRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(TermsFilterParser);
        registry
    }
}

impl std::fmt::Debug for FilterParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterParserRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl FilterParserRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Registers `parser` under each of its names.
    pub fn register(&mut self, parser: impl FilterParser + 'static) {
        let parser: Arc<dyn FilterParser> = Arc::new(parser);
        for name in parser.names() {
            self.parsers.insert(*name, Arc::clone(&parser));
        }
    }

    /// Returns the parser registered under `name`.
    pub fn get(&self, name: &str) -> Option<&dyn FilterParser> {
        self.parsers.get(name).map(|p| p.as_ref())
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.parsers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Parses a filter document of the form `{"<name>": { ...body... }}`.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::MalformedFilter` if the document is not an
    /// object with exactly one key or the body is not an object,
    /// `FilterError::UnknownFilter` if no parser has that name, and any
    /// error of the selected parser.
    pub fn parse_filter(
        &self,
        ctx: &mut ParseContext<'_>,
        document: &Value,
    ) -> FilterResult<FilterNode> {
        let Value::Object(members) = document else {
            return Err(FilterError::malformed(format!(
                "filter must be an object keyed by filter name, got {}",
                kind_of(document)
            )));
        };

        let mut entries = members.iter();
        let (name, body) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => return Err(FilterError::malformed("filter has no filter name")),
            (Some(_), Some(_)) => {
                return Err(FilterError::malformed(format!(
                    "expected a single filter name, found {}",
                    members.len()
                )))
            }
        };

        let parser = self.get(name).ok_or_else(|| FilterError::UnknownFilter {
            name: name.clone(),
        })?;

        tracing::debug!(filter = %name, "parsing filter");
        let mut tokens = JsonTokens::body(body)?;
        parser.parse(ctx, &mut tokens)
    }

    /// Parses `input` as JSON and then as a filter document.
    pub fn parse_str(&self, ctx: &mut ParseContext<'_>, input: &str) -> FilterResult<FilterNode> {
        let document: Value = serde_json::from_str(input)
            .map_err(|e| FilterError::malformed(format!("invalid JSON: {}", e)))?;
        self.parse_filter(ctx, &document)
    }
}

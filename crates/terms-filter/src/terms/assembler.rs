//! Builds the filter tree for a collected request.

use super::error::FilterResult;
use super::node::FilterNode;
use super::request::FilterRequest;
use super::strategy::Composition;
use crate::cache::FilterCache;
use crate::mapping::ResolvedField;

/// Assembles the filter for `request` against its resolved field.
///
/// The execution mode's [`Strategy`](super::Strategy) decides the shape of
/// the tree, whether each per-term leaf goes through `cache`, and whether the
/// final node does when the request has no `_cache` override. Inner leaves
/// are always cached by structure; the request's cache key applies only to
/// the final node.
///
/// # Errors
///
/// Returns `FilterError::UnsupportedExecutionMode` if the execution text is
/// not a known mode, and `FilterError::InvalidTermValue` if a term cannot be
/// encoded for the field.
pub fn assemble(
    request: FilterRequest,
    field: &ResolvedField,
    cache: &dyn FilterCache,
) -> FilterResult<FilterNode> {
    let mode = request.mode()?;
    let strategy = mode.strategy();

    let values = request
        .terms
        .iter()
        .map(|term| field.encode(term))
        .collect::<FilterResult<Vec<_>>>()?;

    let name = field.canonical_name.as_str();
    let filter = match strategy.composition {
        Composition::TermSet => FilterNode::terms(name, values),
        Composition::AnyOf => FilterNode::any_of(leaves(name, values, strategy.cache_leaves, cache)),
        Composition::AllOf => FilterNode::all_of(leaves(name, values, strategy.cache_leaves, cache)),
    };

    let cache_final = request.cache.resolve(strategy.cache_by_default);
    tracing::debug!(
        field = name,
        mode = %mode,
        terms = filter_len(&filter),
        cache_leaves = strategy.cache_leaves,
        cache_final,
        "assembled terms filter"
    );

    if cache_final {
        Ok(cache.cache_filter(filter, request.cache_key.as_ref()))
    } else {
        Ok(filter)
    }
}

/// One `Term` leaf per value, each optionally passed through the cache.
fn leaves(
    field: &str,
    values: Vec<String>,
    cache_each: bool,
    cache: &dyn FilterCache,
) -> Vec<FilterNode> {
    values
        .into_iter()
        .map(|value| {
            let leaf = FilterNode::term(field, value);
            if cache_each {
                cache.cache_filter(leaf, None)
            } else {
                leaf
            }
        })
        .collect()
}

fn filter_len(filter: &FilterNode) -> usize {
    match filter {
        FilterNode::Terms { values, .. } => values.len(),
        other => other.children().len(),
    }
}

//! Compiled filter trees.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::request::CacheKey;

/// A compiled filter.
///
/// Nodes are immutable once built. A [`FilterNode::Cached`] node shares its
/// inner tree through an [`Arc`], so a cache can hand the same tree to many
/// compilations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterNode {
    /// Matches documents whose `field` holds exactly `value`.
    Term {
        /// Index field name.
        field: String,
        /// Indexed value.
        value: String,
    },

    /// Matches documents whose `field` holds any of `values`.
    ///
    /// An empty set matches nothing.
    Terms {
        /// Index field name.
        field: String,
        /// Indexed values.
        values: Vec<String>,
    },

    /// Logical OR. Matches nothing when empty.
    AnyOf(Vec<FilterNode>),

    /// Logical AND. Matches everything when empty.
    AllOf(Vec<FilterNode>),

    /// A node memoized by a filter cache.
    Cached {
        /// The wrapped node.
        inner: Arc<FilterNode>,
        /// Explicit cache key; `None` means the cache keys by structure.
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<CacheKey>,
    },
}

impl FilterNode {
    /// Creates a single-term leaf.
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        FilterNode::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a multi-term leaf.
    pub fn terms(field: impl Into<String>, values: Vec<String>) -> Self {
        FilterNode::Terms {
            field: field.into(),
            values,
        }
    }

    /// Creates an OR of `children`.
    pub fn any_of(children: Vec<FilterNode>) -> Self {
        FilterNode::AnyOf(children)
    }

    /// Creates an AND of `children`.
    pub fn all_of(children: Vec<FilterNode>) -> Self {
        FilterNode::AllOf(children)
    }

    /// Wraps `inner` in a cache node.
    pub fn cached(inner: Arc<FilterNode>, key: Option<CacheKey>) -> Self {
        FilterNode::Cached { inner, key }
    }

    /// Returns true if this node is a cache wrapper.
    pub fn is_cached(&self) -> bool {
        matches!(self, FilterNode::Cached { .. })
    }

    /// Returns the node under any cache wrappers.
    pub fn unwrap_cached(&self) -> &FilterNode {
        match self {
            FilterNode::Cached { inner, .. } => inner.unwrap_cached(),
            other => other,
        }
    }

    /// Returns the child nodes of an `AnyOf` or `AllOf`, or an empty slice.
    pub fn children(&self) -> &[FilterNode] {
        match self {
            FilterNode::AnyOf(children) | FilterNode::AllOf(children) => children,
            _ => &[],
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Term { field, value } => write!(f, "{}:{}", field, value),
            FilterNode::Terms { field, values } => write!(f, "{}:[{}]", field, values.join(", ")),
            FilterNode::AnyOf(children) => write_group(f, "any", children),
            FilterNode::AllOf(children) => write_group(f, "all", children),
            FilterNode::Cached {
                inner,
                key: Some(key),
            } => write!(f, "cached[{}]({})", key, inner),
            FilterNode::Cached { inner, key: None } => write!(f, "cached({})", inner),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, name: &str, children: &[FilterNode]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let node = FilterNode::cached(
            Arc::new(FilterNode::any_of(vec![
                FilterNode::term("status", "active"),
                FilterNode::terms("kind", vec!["a".into(), "b".into()]),
            ])),
            Some(CacheKey::new("k1")),
        );
        assert_eq!(
            node.to_string(),
            "cached[k1](any(status:active, kind:[a, b]))"
        );
        assert_eq!(FilterNode::all_of(vec![]).to_string(), "all()");
    }

    #[test]
    fn test_unwrap_cached() {
        let leaf = FilterNode::term("f", "v");
        let node = FilterNode::cached(
            Arc::new(FilterNode::cached(Arc::new(leaf.clone()), None)),
            None,
        );
        assert!(node.is_cached());
        assert_eq!(node.unwrap_cached(), &leaf);
        assert!(!leaf.is_cached());
    }

    #[test]
    fn test_children() {
        let node = FilterNode::all_of(vec![FilterNode::term("f", "a")]);
        assert_eq!(node.children().len(), 1);
        assert!(FilterNode::term("f", "a").children().is_empty());
    }

    #[test]
    fn test_serialize() {
        let node = FilterNode::cached(Arc::new(FilterNode::term("status", "active")), None);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cached": { "inner": { "term": { "field": "status", "value": "active" } } }
            })
        );
    }
}

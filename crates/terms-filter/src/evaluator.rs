//! Filter evaluation against indexed documents.
//!
//! This module provides the [`FilterEvaluator`] for running a compiled
//! [`FilterNode`] against [`Document`]s.
//!
//! # Example
//!
//! ```
//! use terms_filter_rs::{Document, FilterEvaluator, FilterNode};
//!
//! let filter = FilterNode::any_of(vec![
//!     FilterNode::term("status", "active"),
//!     FilterNode::term("status", "pending"),
//! ]);
//! let doc = Document::new().with_values("status", ["pending"]);
//!
//! let evaluator = FilterEvaluator::new(&filter);
//! assert!(evaluator.matches(&doc));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::terms::FilterNode;

/// An indexed document: index field names mapped to indexed values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, Vec<String>>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `values` to `field`, returning the document.
    pub fn with_values<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.add_value(field, value);
        }
        self
    }

    /// Adds one value to `field`.
    pub fn add_value(&mut self, field: &str, value: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(value.into());
    }

    /// Returns the values of `field`, empty if it is absent.
    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if `field` holds `value`.
    pub fn contains(&self, field: &str, value: &str) -> bool {
        self.values(field).iter().any(|v| v == value)
    }

    /// Returns the field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Evaluates a compiled filter against documents.
#[derive(Debug, Clone, Copy)]
pub struct FilterEvaluator<'a> {
    filter: &'a FilterNode,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates an evaluator for `filter`.
    pub fn new(filter: &'a FilterNode) -> Self {
        Self { filter }
    }

    /// Returns true if `document` matches the filter.
    pub fn matches(&self, document: &Document) -> bool {
        Self::evaluate(self.filter, document)
    }

    /// Returns the documents that match the filter, in input order.
    pub fn filter_documents<'b>(&self, documents: &'b [Document]) -> Vec<&'b Document> {
        documents.iter().filter(|d| self.matches(d)).collect()
    }

    fn evaluate(node: &FilterNode, document: &Document) -> bool {
        match node {
            FilterNode::Term { field, value } => document.contains(field, value),
            FilterNode::Terms { field, values } => {
                values.iter().any(|value| document.contains(field, value))
            }
            // Empty AnyOf is false and empty AllOf is true, by the iterator identities.
            FilterNode::AnyOf(children) => children.iter().any(|c| Self::evaluate(c, document)),
            FilterNode::AllOf(children) => children.iter().all(|c| Self::evaluate(c, document)),
            FilterNode::Cached { inner, .. } => Self::evaluate(inner, document),
        }
    }
}

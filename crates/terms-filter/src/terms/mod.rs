//! Terms filter compiler.
//!
//! This module turns a declarative terms filter body into a [`FilterNode`]
//! tree, choosing one of five execution strategies.
//!
//! # Filter Body
//!
//! ```text
//! {
//!   "<field>": ["<term>", ...],
//!   "execution": "plain" | "bool" | "bool_nocache" | "and" | "and_nocache",
//!   "_name": "<name>",
//!   "_cache": true | false,
//!   "_cache_key": "<key>"
//! }
//! ```
//!
//! # Execution Strategies
//!
//! | Mode | Shape | Leaves cached | Final node cached by default |
//! |------|-------|---------------|------------------------------|
//! | `plain` | one multi-term leaf | - | yes |
//! | `bool` | OR of leaves | yes | no |
//! | `bool_nocache` | OR of leaves | no | yes |
//! | `and` | AND of leaves | yes | no |
//! | `and_nocache` | AND of leaves | no | yes |
//!
//! `_cache` overrides only the final node's caching.
//!
//! # Pipeline
//!
//! - [`ArgumentCollector`] reads the body's tokens into a [`FilterRequest`]
//! - the field is resolved through the context's field resolver
//! - [`assemble`] builds the tree per the mode's [`Strategy`]
//! - [`TermsFilterParser`] applies the resolver's wrapping and registers
//!   named filters
//!
//! # Example
//!
//! ```
//! use terms_filter_rs::{FilterNode, FilterParserRegistry, InMemoryFilterCache, NoMappings, ParseContext};
//!
//! let registry = FilterParserRegistry::default();
//! let cache = InMemoryFilterCache::new();
//! let mut ctx = ParseContext::new(&NoMappings, &cache);
//!
//! let filter = registry
//!     .parse_str(&mut ctx, r#"{"terms": {"status": ["active", "pending"], "execution": "and_nocache"}}"#)
//!     .unwrap();
//! assert!(filter.is_cached());
//! assert!(matches!(filter.unwrap_cached(), FilterNode::AllOf(_)));
//! ```

mod assembler;
mod collector;
mod error;
mod node;
mod parser;
mod request;
mod strategy;
pub(crate) mod token;

pub use assembler::assemble;
pub use collector::ArgumentCollector;
pub use error::{FilterError, FilterResult};
pub use node::FilterNode;
pub use parser::{FilterParser, FilterParserRegistry, TermsFilterParser};
pub use request::{CacheKey, CacheOverride, FilterRequest};
pub use strategy::{Composition, ExecutionMode, Strategy};
pub use token::{JsonTokens, Scalar, Token, TokenStream};

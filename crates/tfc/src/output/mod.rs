//! Output formatting utilities for the tfc CLI.
//!
//! - [`filters`] - Compiled filter trees, named filters and cache counters
//! - [`matches`] - Documents matched by a filter

mod filters;
mod matches;

pub use filters::{format_compiled_json, format_compiled_text};
pub use matches::{format_matches_json, format_matches_table, Match};

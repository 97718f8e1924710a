//! Execution modes and the strategy table that drives assembly.

use std::fmt;
use std::str::FromStr;

use strsim::levenshtein;

use super::error::FilterError;

/// Maximum edit distance for suggesting a mode name.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// How per-term matches are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// One multi-term leaf.
    Plain,
    /// OR of individually cached leaves.
    Bool,
    /// OR of uncached leaves.
    BoolNoCache,
    /// AND of individually cached leaves.
    And,
    /// AND of uncached leaves.
    AndNoCache,
}

/// Shape of the node built from the terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    /// A single `Terms` leaf holding every term.
    TermSet,
    /// `AnyOf` over one `Term` leaf per term.
    AnyOf,
    /// `AllOf` over one `Term` leaf per term.
    AllOf,
}

/// Assembly algorithm and caching policy for one execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    /// How the leaves are combined.
    pub composition: Composition,
    /// Whether each per-term leaf goes through the cache before composition.
    pub cache_leaves: bool,
    /// Whether the final node is cached when `_cache` is absent.
    pub cache_by_default: bool,
}

impl ExecutionMode {
    /// Every mode, in table order.
    pub const ALL: [ExecutionMode; 5] = [
        ExecutionMode::Plain,
        ExecutionMode::Bool,
        ExecutionMode::BoolNoCache,
        ExecutionMode::And,
        ExecutionMode::AndNoCache,
    ];

    /// Returns the `execution` text for this mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Plain => "plain",
            ExecutionMode::Bool => "bool",
            ExecutionMode::BoolNoCache => "bool_nocache",
            ExecutionMode::And => "and",
            ExecutionMode::AndNoCache => "and_nocache",
        }
    }

    /// Returns the strategy for this mode.
    ///
    /// Modes that cache each leaf do not cache the composite unless asked;
    /// modes with uncached leaves cache the composite unless told not to.
    pub const fn strategy(self) -> Strategy {
        match self {
            ExecutionMode::Plain => Strategy {
                composition: Composition::TermSet,
                cache_leaves: false,
                cache_by_default: true,
            },
            ExecutionMode::Bool => Strategy {
                composition: Composition::AnyOf,
                cache_leaves: true,
                cache_by_default: false,
            },
            ExecutionMode::BoolNoCache => Strategy {
                composition: Composition::AnyOf,
                cache_leaves: false,
                cache_by_default: true,
            },
            ExecutionMode::And => Strategy {
                composition: Composition::AllOf,
                cache_leaves: true,
                cache_by_default: false,
            },
            ExecutionMode::AndNoCache => Strategy {
                composition: Composition::AllOf,
                cache_leaves: false,
                cache_by_default: true,
            },
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExecutionMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| FilterError::UnsupportedExecutionMode {
                value: s.to_string(),
                suggestion: suggest_mode(s),
            })
    }
}

/// Finds the closest mode name to `value`, if one is within reach.
fn suggest_mode(value: &str) -> Option<String> {
    let lowered = value.to_lowercase();
    let (best, distance) = ExecutionMode::ALL
        .into_iter()
        .map(|mode| (mode, levenshtein(&lowered, mode.as_str())))
        .min_by_key(|(_, d)| *d)?;

    if distance <= MAX_SUGGESTION_DISTANCE && distance < value.len() {
        Some(best.as_str().to_string())
    } else {
        None
    }
}

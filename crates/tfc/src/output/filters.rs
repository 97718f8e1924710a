//! Compiled filter output formatting.

use std::collections::BTreeMap;

use owo_colors::OwoColorize;
use serde::Serialize;
use terms_filter_rs::{CacheStats, FilterNode};

use crate::commands::session::Compiled;

/// Indentation per tree level.
const INDENT: &str = "  ";

/// JSON output structure for the compile command.
#[derive(Serialize)]
pub struct CompileOutput<'a> {
    pub filters: &'a [FilterNode],
    pub named_filters: &'a BTreeMap<String, FilterNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

/// Formats compiled filters as JSON.
pub fn format_compiled_json(
    compiled: &Compiled,
    stats: Option<CacheStats>,
) -> Result<String, serde_json::Error> {
    let output = CompileOutput {
        filters: &compiled.filters,
        named_filters: &compiled.named,
        cache: stats,
    };

    serde_json::to_string_pretty(&output)
}

/// Formats compiled filters as indented trees, followed by named filters
/// and, when given, cache counters.
pub fn format_compiled_text(
    compiled: &Compiled,
    stats: Option<CacheStats>,
    use_colors: bool,
) -> String {
    let mut output = String::new();
    let numbered = compiled.filters.len() > 1;

    for (i, filter) in compiled.filters.iter().enumerate() {
        if numbered {
            if i > 0 {
                output.push('\n');
            }
            output.push_str(&heading(&format!("Filter {}", i + 1), use_colors));
            output.push('\n');
        }
        output.push_str(&format_filter_tree(filter, use_colors));
    }

    if !compiled.named.is_empty() {
        output.push('\n');
        output.push_str(&format_named_filters(&compiled.named, use_colors));
    }

    if let Some(stats) = stats {
        output.push('\n');
        output.push_str(&format_cache_stats(&stats, use_colors));
    }

    output
}

/// Renders `filter` as an indented tree, one node per line.
pub fn format_filter_tree(filter: &FilterNode, use_colors: bool) -> String {
    let mut output = String::new();
    write_node(&mut output, filter, 0, use_colors);
    output
}

fn write_node(output: &mut String, node: &FilterNode, depth: usize, use_colors: bool) {
    output.push_str(&INDENT.repeat(depth));
    output.push_str(&node_label(node, use_colors));
    output.push('\n');

    match node {
        FilterNode::Cached { inner, .. } => write_node(output, inner, depth + 1, use_colors),
        FilterNode::AnyOf(children) | FilterNode::AllOf(children) => {
            for child in children {
                write_node(output, child, depth + 1, use_colors);
            }
        }
        FilterNode::Term { .. } | FilterNode::Terms { .. } => {}
    }
}

fn node_label(node: &FilterNode, use_colors: bool) -> String {
    match node {
        FilterNode::Term { field, value } => {
            format!("{} {} = {}", keyword("term", use_colors), field_name(field, use_colors), value)
        }
        FilterNode::Terms { field, values } => format!(
            "{} {} in [{}]",
            keyword("terms", use_colors),
            field_name(field, use_colors),
            values.join(", ")
        ),
        FilterNode::AnyOf(children) if children.is_empty() => {
            format!("{} {}", keyword("any", use_colors), note("(matches nothing)", use_colors))
        }
        FilterNode::AnyOf(_) => keyword("any", use_colors),
        FilterNode::AllOf(children) if children.is_empty() => {
            format!("{} {}", keyword("all", use_colors), note("(matches everything)", use_colors))
        }
        FilterNode::AllOf(_) => keyword("all", use_colors),
        FilterNode::Cached { key: Some(key), .. } => {
            note(&format!("cached [{}]", key), use_colors)
        }
        FilterNode::Cached { key: None, .. } => note("cached", use_colors),
    }
}

/// Formats named filters as `name: filter` lines.
pub fn format_named_filters(named: &BTreeMap<String, FilterNode>, use_colors: bool) -> String {
    let mut output = heading("Named filters", use_colors);
    output.push('\n');

    let width = named.keys().map(|name| name.chars().count()).max().unwrap_or(0);
    for (name, filter) in named {
        let padded = format!("{:<width$}", name, width = width);
        if use_colors {
            output.push_str(&format!("  {}  {}\n", padded.bold(), filter));
        } else {
            output.push_str(&format!("  {}  {}\n", padded, filter));
        }
    }

    output
}

/// Formats cache counters on one line.
pub fn format_cache_stats(stats: &CacheStats, use_colors: bool) -> String {
    let line = format!(
        "Cache: {} entries, {} hits, {} misses\n",
        stats.entries, stats.hits, stats.misses
    );
    if use_colors {
        line.dimmed().to_string()
    } else {
        line
    }
}

fn heading(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.green().bold().to_string()
    } else {
        text.to_string()
    }
}

fn keyword(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.cyan().to_string()
    } else {
        text.to_string()
    }
}

fn field_name(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.green().to_string()
    } else {
        text.to_string()
    }
}

fn note(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use terms_filter_rs::CacheKey;

    fn compiled(filters: Vec<FilterNode>) -> Compiled {
        Compiled {
            filters,
            named: BTreeMap::new(),
        }
    }

    fn bool_filter() -> FilterNode {
        let leaf = |v: &str| FilterNode::cached(Arc::new(FilterNode::term("status", v)), None);
        FilterNode::cached(
            Arc::new(FilterNode::any_of(vec![leaf("active"), leaf("pending")])),
            Some(CacheKey::new("k1")),
        )
    }

    #[test]
    fn test_tree_indents_children() {
        let tree = format_filter_tree(&bool_filter(), false);
        let expected = "\
cached [k1]
  any
    cached
      term status = active
    cached
      term status = pending
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_tree_marks_empty_groups() {
        assert_eq!(
            format_filter_tree(&FilterNode::any_of(vec![]), false),
            "any (matches nothing)\n"
        );
        assert_eq!(
            format_filter_tree(&FilterNode::all_of(vec![]), false),
            "all (matches everything)\n"
        );
        assert_eq!(
            format_filter_tree(&FilterNode::terms("tag", vec![]), false),
            "terms tag in []\n"
        );
    }

    #[test]
    fn test_single_filter_has_no_heading() {
        let text = format_compiled_text(
            &compiled(vec![FilterNode::terms("tag", vec!["a".into(), "b".into()])]),
            None,
            false,
        );
        assert_eq!(text, "terms tag in [a, b]\n");
    }

    #[test]
    fn test_multiple_filters_are_numbered() {
        let text = format_compiled_text(
            &compiled(vec![FilterNode::term("a", "1"), FilterNode::term("b", "2")]),
            None,
            false,
        );
        assert_eq!(text, "Filter 1\nterm a = 1\n\nFilter 2\nterm b = 2\n");
    }

    #[test]
    fn test_named_filters_and_stats_follow_trees() {
        let mut output = compiled(vec![FilterNode::term("a", "1")]);
        output.named.insert("first".to_string(), FilterNode::term("a", "1"));
        output.named.insert("second_one".to_string(), FilterNode::term("b", "2"));

        let stats = CacheStats {
            hits: 2,
            misses: 3,
            entries: 3,
        };
        let text = format_compiled_text(&output, Some(stats), false);

        assert!(text.contains("Named filters\n  first       a:1\n  second_one  b:2\n"));
        assert!(text.ends_with("Cache: 3 entries, 2 hits, 3 misses\n"));
    }

    #[test]
    fn test_colors_only_when_requested() {
        let plain = format_filter_tree(&bool_filter(), false);
        let colored = format_filter_tree(&bool_filter(), true);

        assert!(!plain.contains('\x1b'));
        assert!(colored.contains('\x1b'));
    }

    #[test]
    fn test_compiled_json_shape() {
        let mut output = compiled(vec![FilterNode::term("a", "1")]);
        output.named.insert("n".to_string(), FilterNode::term("a", "1"));

        let json = format_compiled_json(&output, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["filters"].as_array().unwrap().len(), 1);
        assert!(value["named_filters"]["n"].is_object());
        assert!(value.get("cache").is_none());

        let json = format_compiled_json(&output, Some(CacheStats::default())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["cache"]["hits"], 0);
    }
}

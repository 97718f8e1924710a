//! Match result output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use terms_filter_rs::FilterNode;

/// Widest document preview in table output, in characters.
const PREVIEW_WIDTH: usize = 72;

/// One matching document.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    /// Position of the document in the input.
    pub index: usize,
    /// Document as given.
    pub source: &'a Value,
}

/// JSON output structure for the match command.
#[derive(Serialize)]
pub struct MatchOutput<'a> {
    pub filter: &'a FilterNode,
    pub total: usize,
    pub matched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchEntry<'a>>>,
}

/// JSON output structure for a single match.
#[derive(Serialize)]
pub struct MatchEntry<'a> {
    pub index: usize,
    pub document: &'a Value,
}

/// Formats match results as JSON. With `count_only` the documents are left out.
pub fn format_matches_json(
    filter: &FilterNode,
    matches: &[Match<'_>],
    total: usize,
    count_only: bool,
) -> Result<String, serde_json::Error> {
    let entries = (!count_only).then(|| {
        matches
            .iter()
            .map(|m| MatchEntry {
                index: m.index,
                document: m.source,
            })
            .collect()
    });

    let output = MatchOutput {
        filter,
        total,
        matched: matches.len(),
        matches: entries,
    };

    serde_json::to_string_pretty(&output)
}

/// Formats match results as a table of document previews and a summary line.
pub fn format_matches_table(matches: &[Match<'_>], total: usize, use_colors: bool) -> String {
    let mut output = String::new();

    if !matches.is_empty() {
        let header = format!("{:<6} {}", "#", "Document");
        if use_colors {
            output.push_str(&format!("{}\n", header.dimmed()));
        } else {
            output.push_str(&header);
            output.push('\n');
        }

        for m in matches {
            let preview = truncate_str(&m.source.to_string(), PREVIEW_WIDTH);
            output.push_str(&format!("{:<6} {}\n", m.index, preview));
        }
        output.push('\n');
    }

    output.push_str(&format_match_count(matches.len(), total, use_colors));
    output
}

/// Formats the `N of M documents matched` summary line.
pub fn format_match_count(matched: usize, total: usize, use_colors: bool) -> String {
    let noun = if total == 1 { "document" } else { "documents" };
    let line = format!("{} of {} {} matched", matched, total, noun);

    if use_colors && matched > 0 {
        format!("{}\n", line.green())
    } else if use_colors {
        format!("{}\n", line.yellow())
    } else {
        format!("{}\n", line)
    }
}

/// Truncates `s` to `max_len` characters, marking the cut with `...`.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

//! Match command implementation.
//!
//! Compiles one filter, indexes a set of documents through the same field
//! mappings and prints the documents the filter matches.

use std::path::{Path, PathBuf};

use serde_json::Value;
use terms_filter_rs::FilterEvaluator;

use super::session::Session;
use super::{parse_json, read_input, CommandContext, CommandError, Result};
use crate::output::{format_matches_json, format_matches_table, Match};

/// Options for the match command.
#[derive(Debug)]
pub struct MatchOptions {
    /// Filter file, `-` for stdin, or inline JSON.
    pub filter: String,
    /// File holding the documents.
    pub documents: PathBuf,
    /// Only report the number of matches.
    pub count: bool,
}

/// Executes the match command.
pub fn execute(ctx: &CommandContext, opts: &MatchOptions) -> Result<()> {
    let session = Session::load(ctx)?;
    let filter = read_filter(&opts.filter)?;
    let documents = parse_json(&read_input(Some(opts.documents.as_path()))?, "documents")?;

    let output = render(ctx, &session, &filter, &documents, opts.count)?;
    if !output.is_empty() {
        print!("{}", output);
    }
    Ok(())
}

/// Reads the filter argument: inline JSON when it looks like an object,
/// otherwise a path (`-` for stdin).
fn read_filter(arg: &str) -> Result<Value> {
    let text = if arg.trim_start().starts_with('{') {
        arg.to_string()
    } else {
        read_input(Some(Path::new(arg)))?
    };
    parse_json(&text, "filter")
}

fn render(
    ctx: &CommandContext,
    session: &Session,
    filter: &Value,
    documents: &Value,
    count_only: bool,
) -> Result<String> {
    if filter.is_array() {
        return Err(CommandError::Input(
            "match takes a single filter document, not an array".to_string(),
        ));
    }

    let compiled = session.compile(filter)?;
    let Some(filter) = compiled.filters.first() else {
        return Err(CommandError::Input("no filter to match with".to_string()));
    };

    let sources: Vec<&Value> = match documents {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    let indexed = session.index_documents(documents)?;

    let evaluator = FilterEvaluator::new(filter);
    let matches: Vec<Match<'_>> = sources
        .iter()
        .zip(&indexed)
        .enumerate()
        .filter(|(_, (_, document))| evaluator.matches(document))
        .map(|(index, (source, _))| Match {
            index,
            source: *source,
        })
        .collect();

    tracing::debug!(
        total = sources.len(),
        matched = matches.len(),
        "evaluated filter"
    );

    if ctx.json_output {
        Ok(format!(
            "{}\n",
            format_matches_json(filter, &matches, sources.len(), count_only)?
        ))
    } else if ctx.quiet {
        Ok(String::new())
    } else if count_only {
        Ok(format!("{}\n", matches.len()))
    } else {
        let use_colors = ctx.use_colors && session.color_enabled();
        Ok(format_matches_table(&matches, sources.len(), use_colors))
    }
}

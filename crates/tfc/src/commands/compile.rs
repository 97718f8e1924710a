//! Compile command implementation.
//!
//! Reads a filter document, or an array of them, and prints the compiled trees.

use std::path::PathBuf;

use serde_json::Value;

use super::session::Session;
use super::{parse_json, read_input, CommandContext, Result};
use crate::output::{format_compiled_json, format_compiled_text};

/// Options for the compile command.
#[derive(Debug, Default)]
pub struct CompileOptions {
    /// Input file; stdin when `None`.
    pub input: Option<PathBuf>,
    /// Print cache counters after compiling.
    pub stats: bool,
}

/// Executes the compile command.
pub fn execute(ctx: &CommandContext, opts: &CompileOptions) -> Result<()> {
    let session = Session::load(ctx)?;
    let text = read_input(opts.input.as_deref())?;
    let document = parse_json(&text, "filter input")?;

    let output = render(ctx, &session, &document, opts)?;
    if !output.is_empty() {
        print!("{}", output);
    }
    Ok(())
}

/// Compiles `document` and renders the result for `ctx`.
fn render(
    ctx: &CommandContext,
    session: &Session,
    document: &Value,
    opts: &CompileOptions,
) -> Result<String> {
    let compiled = session.compile(document)?;
    let stats = if opts.stats || ctx.verbose {
        session.cache_stats()
    } else {
        None
    };

    if ctx.json_output {
        Ok(format!("{}\n", format_compiled_json(&compiled, stats)?))
    } else if ctx.quiet {
        Ok(String::new())
    } else {
        let use_colors = ctx.use_colors && session.color_enabled();
        Ok(format_compiled_text(&compiled, stats, use_colors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use terms_filter_rs::MappingConfig;

    fn ctx(json_output: bool, quiet: bool) -> CommandContext {
        CommandContext {
            json_output,
            use_colors: false,
            quiet,
            verbose: false,
            mapping: None,
        }
    }

    fn session() -> Session {
        let mapping: MappingConfig = toml::from_str("[fields.status]\ntype = \"lowercase\"").unwrap();
        Session::new(mapping, true)
    }

    #[test]
    fn test_render_text_tree() {
        let document = json!({"terms": {"status": ["A", "B"], "execution": "bool"}});
        let output = render(&ctx(false, false), &session(), &document, &CompileOptions::default())
            .unwrap();

        assert_eq!(output, "any\n  cached\n    term status = a\n  cached\n    term status = b\n");
    }

    #[test]
    fn test_render_with_stats() {
        let document = json!([
            {"terms": {"status": ["a"]}},
            {"terms": {"status": ["A"]}},
        ]);
        let opts = CompileOptions {
            input: None,
            stats: true,
        };
        let output = render(&ctx(false, false), &session(), &document, &opts).unwrap();

        assert!(output.starts_with("Filter 1\n"));
        assert!(output.ends_with("Cache: 1 entries, 1 hits, 1 misses\n"));
    }

    #[test]
    fn test_render_json() {
        let document = json!({"in": {"status": ["X"], "_name": "x"}});
        let output = render(&ctx(true, false), &session(), &document, &CompileOptions::default())
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["filters"].as_array().unwrap().len(), 1);
        assert!(value["named_filters"].get("x").is_some());
    }

    #[test]
    fn test_render_quiet_prints_nothing() {
        let document = json!({"terms": {"status": ["a"]}});
        let output = render(&ctx(false, true), &session(), &document, &CompileOptions::default())
            .unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_render_reports_filter_errors() {
        let document = json!({"terms": {"status": ["a"], "execution": "boo"}});
        let err = render(&ctx(false, false), &session(), &document, &CompileOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("did you mean [bool]?"));
    }
}

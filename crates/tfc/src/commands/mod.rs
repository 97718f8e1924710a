//! Command implementations for the tfc CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod compile;
pub mod completions;
pub mod config;
pub mod matching;
pub mod session;

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Filter compilation error.
    #[error("filter error: {0}")]
    Filter(#[from] terms_filter_rs::FilterError),

    /// Invalid command input.
    #[error("invalid input: {0}")]
    Input(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
    /// Mapping file given on the command line.
    pub mapping: Option<PathBuf>,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    ///
    /// Colors are off when `--no-color` is given or `NO_COLOR` is set.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && env::var_os("NO_COLOR").is_none(),
            quiet: cli.quiet,
            verbose: cli.verbose,
            mapping: cli.mapping.clone(),
        }
    }
}

/// Reads command input from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path).map_err(|e| {
            CommandError::Input(format!("failed to read {}: {}", path.display(), e))
        }),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Parses `text` as JSON, naming `what` in the error.
pub fn parse_json(text: &str, what: &str) -> Result<serde_json::Value> {
    serde_json::from_str(text)
        .map_err(|e| CommandError::Input(format!("{} is not valid JSON: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_input_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"terms": {{"a": ["b"]}}}}"#).unwrap();

        let text = read_input(Some(file.path())).unwrap();
        assert_eq!(text, r#"{"terms": {"a": ["b"]}}"#);
    }

    #[test]
    fn test_read_input_missing_file_names_path() {
        let err = read_input(Some(Path::new("/nonexistent/tfc/filter.json"))).unwrap_err();
        assert!(matches!(err, CommandError::Input(_)));
        assert!(err.to_string().contains("/nonexistent/tfc/filter.json"));
    }

    #[test]
    fn test_parse_json_names_input() {
        let err = parse_json("{not json", "filter").unwrap_err();
        assert!(err.to_string().starts_with("invalid input: filter is not valid JSON"));
    }

    #[test]
    fn test_filter_error_converts() {
        let err: CommandError = terms_filter_rs::FilterError::MissingFieldName.into();
        assert!(matches!(err, CommandError::Filter(_)));
        assert!(err.to_string().starts_with("filter error: "));
    }
}

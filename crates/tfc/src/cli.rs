//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the tfc CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// tfc - compile and evaluate terms filters
#[derive(Parser, Debug)]
#[command(name = "tfc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Field mapping file (overrides the [mapping] table of the config)
    #[arg(long, global = true, env = "TFC_MAPPING", value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile filter documents and print the resulting trees
    #[command(alias = "c")]
    Compile {
        /// File holding a filter document or an array of them (default: stdin)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Print cache statistics after compiling
        #[arg(long)]
        stats: bool,
    },

    /// Compile a filter and print the documents it matches
    #[command(alias = "m")]
    Match {
        /// Filter document: a file path, "-" for stdin, or inline JSON
        filter: String,

        /// File holding a JSON array of documents
        #[arg(value_name = "DOCS")]
        documents: PathBuf,

        /// Only print the number of matching documents
        #[arg(long)]
        count: bool,
    },

    /// View and create configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print config file path
    Path,
}

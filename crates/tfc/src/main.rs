use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, ConfigCommands};
use commands::compile::CompileOptions;
use commands::matching::MatchOptions;
use commands::{CommandContext, CommandError};

/// Environment variable holding the log filter.
const ENV_LOG: &str = "TFC_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("{error_json}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Installs the stderr log subscriber.
///
/// `TFC_LOG`, then `RUST_LOG`, select the filter; otherwise warnings only,
/// or debug output for this tool under `--verbose`.
fn init_logging(cli: &Cli) {
    let default_filter = if cli.verbose {
        "warn,tfc=debug,terms_filter_rs=debug"
    } else {
        "warn"
    };

    let filter = std::env::var(ENV_LOG)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_filter.to_string());

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!cli.no_color)
        .compact()
        .with_env_filter(filter)
        .init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    let ctx = CommandContext::from_cli(cli);

    match &cli.command {
        Some(Commands::Compile { input, stats }) => {
            let opts = CompileOptions {
                input: input.clone(),
                stats: *stats,
            };
            commands::compile::execute(&ctx, &opts)
        }
        Some(Commands::Match {
            filter,
            documents,
            count,
        }) => {
            let opts = MatchOptions {
                filter: filter.clone(),
                documents: documents.clone(),
                count: *count,
            };
            commands::matching::execute(&ctx, &opts)
        }
        Some(Commands::Config { command }) => match command {
            Some(ConfigCommands::Show) | None => commands::config::execute_show(&ctx),
            Some(ConfigCommands::Init { force }) => commands::config::execute_init(&ctx, *force),
            Some(ConfigCommands::Path) => commands::config::execute_path(&ctx),
        },
        Some(Commands::Completions { shell }) => {
            commands::completions::execute(shell).map_err(CommandError::Io)
        }
        None => {
            if !ctx.quiet {
                println!("tfc - terms filter compiler");
                println!("Use --help for usage information");
            }
            Ok(())
        }
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::Input(_) => "INPUT_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(exit_status(e))
}

fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Filter(_) => 1,
        CommandError::Input(_) => 2,
        CommandError::Io(_) => 3,
        CommandError::Config(_) => 5,
        CommandError::Json(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terms_filter_rs::FilterError;

    #[test]
    fn test_error_codes() {
        let filter = CommandError::Filter(FilterError::MissingFieldName);
        assert_eq!(error_code(&filter), "FILTER_ERROR");
        assert_eq!(exit_status(&filter), 1);

        let input = CommandError::Input("bad".to_string());
        assert_eq!(error_code(&input), "INPUT_ERROR");
        assert_eq!(exit_status(&input), 2);

        let config = CommandError::Config("bad".to_string());
        assert_eq!(error_code(&config), "CONFIG_ERROR");
        assert_eq!(exit_status(&config), 5);

        let io = CommandError::Io(std::io::Error::other("bad"));
        assert_eq!(error_code(&io), "IO_ERROR");
        assert_eq!(exit_status(&io), 3);
    }

    #[test]
    fn test_filter_error_message_passes_through() {
        let e = CommandError::Filter(FilterError::UnknownFilter {
            name: "term".to_string(),
        });
        assert_eq!(
            e.to_string(),
            "filter error: no filter registered for [term]"
        );
    }
}

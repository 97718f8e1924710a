//! Shell completions command implementation.
//!
//! Generate shell completions for bash, zsh, fish, and powershell.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell as ClapShell};

use crate::cli::{Cli, Shell};

/// Binary name completions are generated for.
const BIN_NAME: &str = "tfc";

impl From<&Shell> for ClapShell {
    fn from(shell: &Shell) -> Self {
        match shell {
            Shell::Bash => ClapShell::Bash,
            Shell::Zsh => ClapShell::Zsh,
            Shell::Fish => ClapShell::Fish,
            Shell::Powershell => ClapShell::PowerShell,
        }
    }
}

/// Generate shell completions for the given shell and write to stdout.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn execute(shell: &Shell) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write_completions(shell, &mut stdout)?;
    stdout.flush()
}

/// Writes completions for `shell` to `out`.
fn write_completions(shell: &Shell, out: &mut dyn Write) -> io::Result<()> {
    let mut cmd = Cli::command();
    generate(ClapShell::from(shell), &mut cmd, BIN_NAME, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completions(shell: Shell) -> String {
        let mut buffer = Vec::new();
        write_completions(&shell, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_shell_mapping() {
        assert!(matches!(ClapShell::from(&Shell::Bash), ClapShell::Bash));
        assert!(matches!(ClapShell::from(&Shell::Zsh), ClapShell::Zsh));
        assert!(matches!(ClapShell::from(&Shell::Fish), ClapShell::Fish));
        assert!(matches!(
            ClapShell::from(&Shell::Powershell),
            ClapShell::PowerShell
        ));
    }

    #[test]
    fn test_bash_completions_name_subcommands() {
        let script = completions(Shell::Bash);
        assert!(script.contains("tfc"));
        assert!(script.contains("compile"));
        assert!(script.contains("match"));
    }

    #[test]
    fn test_fish_completions_include_global_flags() {
        let script = completions(Shell::Fish);
        assert!(script.contains("no-color"));
        assert!(script.contains("mapping"));
    }
}

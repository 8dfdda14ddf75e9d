//! Shell completions command implementation.

use std::io::{self, Write};

use clap::CommandFactory;

use crate::cli::{Cli, Shell};
use crate::error::Result;

const BIN_NAME: &str = "safelist-sync";

impl From<&Shell> for clap_complete::Shell {
    fn from(shell: &Shell) -> Self {
        match shell {
            Shell::Bash => Self::Bash,
            Shell::Zsh => Self::Zsh,
            Shell::Fish => Self::Fish,
            Shell::PowerShell => Self::PowerShell,
            Shell::Elvish => Self::Elvish,
        }
    }
}

/// Print the completion script for `shell` to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be flushed.
pub fn execute(shell: &Shell) -> Result<()> {
    let mut stdout = io::stdout().lock();
    render(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

fn render(shell: &Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    clap_complete::generate(clap_complete::Shell::from(shell), &mut cmd, BIN_NAME, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_script_covers_subcommands() {
        let mut buf = Vec::new();
        render(&Shell::Bash, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains(BIN_NAME));
        assert!(script.contains("migrate"));
        assert!(script.contains("--dry-run"));
    }
}

//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// safelist-sync - keep appliance safelists in step
#[derive(Parser, Debug)]
#[command(name = "safelist-sync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v diagnostics, -vv trace)
    #[arg(short, long, alias = "devel", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except results)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize safelists between hosts, repeating on an interval
    Sync(SyncArgs),

    /// Add missing hash_key fields to a safelist export
    Migrate(MigrateArgs),

    /// Inspect cached host snapshots
    Cache(CacheArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Sync
// ============================================================================

#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Systems that both provide and receive entries (host:port)
    #[arg(short, long, num_args = 1.., value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Systems that only receive entries (host:port)
    #[arg(short, long, num_args = 1.., value_delimiter = ',')]
    pub recipients: Vec<String>,

    /// Text that must appear in the comment field (case insensitive); other entries are ignored
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// Seconds between checks
    #[arg(short, long, default_value_t = crate::config::DEFAULT_WAIT_SECS)]
    pub wait: u64,

    /// Compute changes but do not send them
    #[arg(short, long, alias = "dryrun")]
    pub dry_run: bool,

    /// Run a single pass and exit
    #[arg(long)]
    pub once: bool,

    /// Snapshot cache directory (default: ~/.cache/safelist-sync)
    #[arg(long, env = "SAFELIST_SYNC_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

// ============================================================================
// Migrate
// ============================================================================

#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Read the safelist from this file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Write the result to this file (default: stdout, or <input>-hashed.json with --input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Refuse entries in the previous export format ("Type" field)
    #[arg(long)]
    pub strict: bool,

    /// Derive hash_key from entry content instead of the placeholder value
    #[arg(long)]
    pub content_hash: bool,
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Args, Debug, Default)]
pub struct CacheArgs {
    /// Print the cached list for one host
    #[arg(long)]
    pub host: Option<String>,

    /// Snapshot cache directory (default: ~/.cache/safelist-sync)
    #[arg(long, env = "SAFELIST_SYNC_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sync_args() {
        let cli = Cli::parse_from([
            "safelist-sync", "sync", "-s", "h1:80", "h2:80", "-r", "h3:80", "-f", "tor", "-d",
        ]);
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(args.sources, vec!["h1:80", "h2:80"]);
        assert_eq!(args.recipients, vec!["h3:80"]);
        assert_eq!(args.filter, "tor");
        assert_eq!(args.wait, 300);
        assert!(args.dry_run);
        assert!(!args.once);
    }

    #[test]
    fn test_sync_args_comma_separated() {
        let cli = Cli::parse_from(["safelist-sync", "sync", "--sources", "h1:80,h2:80", "--wait", "60"]);
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(args.sources, vec!["h1:80", "h2:80"]);
        assert!(args.recipients.is_empty());
        assert_eq!(args.wait, 60);
    }

    #[test]
    fn test_devel_alias() {
        let cli = Cli::parse_from(["safelist-sync", "--devel", "version"]);
        assert_eq!(cli.verbose, 1);
    }
}

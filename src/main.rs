//! safelist-sync entry point.

use clap::Parser;
use safelist::cli::commands;
use safelist::cli::{Cli, Commands};
use safelist::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, &cli);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Print a fatal error.
///
/// Usage errors only appear on the diagnostic channel (`-v`); everything
/// else is printed unless `--quiet`.
fn report_error(e: &Error, cli: &Cli) {
    if e.error_code().is_usage() && cli.verbose == 0 {
        return;
    }

    if cli.json {
        eprintln!("{}", e.to_structured_json());
    } else if !cli.quiet {
        if let Some(hint) = e.hint() {
            eprintln!("Error: {e}, exiting.\n  Hint: {hint}");
        } else {
            eprintln!("Error: {e}, exiting.");
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info,safelist=debug"),
            _ => EnvFilter::new("trace,hyper=debug,reqwest=debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    match &cli.command {
        Commands::Sync(args) => commands::sync::execute(args, cli.json),
        Commands::Migrate(args) => commands::migrate::execute(args, cli.json, cli.quiet),
        Commands::Cache(args) => commands::cache::execute(args, cli.json),
        Commands::Completions { shell } => commands::completions::execute(shell),
        Commands::Version => commands::version::execute(cli.json),
    }
}

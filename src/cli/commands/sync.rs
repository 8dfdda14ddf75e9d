//! Sync command implementation.
//!
//! Builds a [`SyncConfig`] from the arguments, then runs the driver on a
//! single-threaded runtime until Ctrl-C arrives between passes. With
//! `--once` a single pass runs and its report is printed.

use std::time::Duration;

use colored::Colorize;
use tracing::warn;

use crate::cli::SyncArgs;
use crate::config::{SyncConfig, resolve_cache_dir};
use crate::error::Result;
use crate::sync::{PassReport, PushOutcome, Syncer};
use crate::transport::HttpTransport;

/// Execute the sync command.
///
/// # Errors
///
/// Returns a usage error when too few hosts are configured, before any
/// request is made. Per-host failures during a pass are never errors.
pub fn execute(args: &SyncArgs, json: bool) -> Result<()> {
    let cache_dir = resolve_cache_dir(args.cache_dir.as_deref())?;
    let config = SyncConfig::new(
        args.sources.clone(),
        args.recipients.clone(),
        args.filter.clone(),
        Duration::from_secs(args.wait),
        args.dry_run,
        cache_dir,
    )?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let mut syncer = Syncer::new(config, HttpTransport::new());
        if args.once {
            let report = syncer.run_pass().await;
            print_report(&report, syncer.config().dry_run, json)
        } else {
            syncer.run(shutdown_signal()).await;
            Ok(())
        }
    })
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn print_report(report: &PassReport, dry_run: bool, json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({
            "dry_run": dry_run,
            "report": report,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{}", "Sync pass complete".bold());
    println!("  Canonical entries: {}", report.canonical);
    if dry_run {
        println!("  {}", "Dry run: no changes were sent".yellow());
    }
    println!();

    for host in &report.hosts {
        let fetched = host
            .fetched
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        let outcome = match host.push {
            PushOutcome::NotFetched => "unreachable".red(),
            PushOutcome::UpToDate => "up to date".green(),
            PushOutcome::DryRun => format!("{} missing", host.missing).yellow(),
            PushOutcome::Pushed => format!("{} added", host.missing).green(),
            PushOutcome::Failed => format!("{} not accepted", host.missing).red(),
        };
        println!(
            "  {:<24} {:<9} fetched {:>5}  {}",
            host.host,
            format!("{:?}", host.role).to_lowercase(),
            fetched,
            outcome
        );
    }

    Ok(())
}

//! Cache command implementation.
//!
//! Lists the host snapshots written by `sync`, or prints one of them.

use colored::Colorize;

use crate::cache::SnapshotCache;
use crate::cli::CacheArgs;
use crate::config::resolve_cache_dir;
use crate::error::Result;

/// Execute the cache command.
///
/// # Errors
///
/// Returns an error if the cache root cannot be resolved or read, or if
/// the requested host has no snapshot.
pub fn execute(args: &CacheArgs, json: bool) -> Result<()> {
    let cache = SnapshotCache::new(resolve_cache_dir(args.cache_dir.as_deref())?);

    if let Some(host) = &args.host {
        let entries = cache.load(host)?;
        if json {
            println!("{}", serde_json::to_string(&entries)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        return Ok(());
    }

    let snapshots = cache.list()?;

    if json {
        let output = serde_json::json!({
            "cache_dir": cache.root().display().to_string(),
            "snapshots": snapshots,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Cache directory: {}", cache.root().display());
    println!();

    if snapshots.is_empty() {
        println!("{}", "No cached snapshots.".dimmed());
        return Ok(());
    }

    println!("{}", "Snapshots:".blue().bold());
    for snapshot in &snapshots {
        let entries = snapshot
            .entries
            .map_or_else(|| "unreadable".red().to_string(), |n| format!("{n} entries"));
        let modified = snapshot
            .modified
            .map_or_else(String::new, |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
        println!(
            "  {} ({}, {}) {}",
            snapshot.host,
            entries,
            format_size(snapshot.size),
            modified.dimmed()
        );
    }

    Ok(())
}

/// Format a byte size as a human-readable string.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

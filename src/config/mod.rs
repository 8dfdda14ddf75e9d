//! Configuration management.
//!
//! Everything a sync pass needs is carried in an explicit [`SyncConfig`]
//! built once from the command line and handed to the driver. Nothing
//! reads parsed arguments from global state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

/// Default seconds between passes.
pub const DEFAULT_WAIT_SECS: u64 = 300;

/// Environment variable overriding the cache root.
pub const CACHE_DIR_ENV: &str = "SAFELIST_SYNC_CACHE_DIR";

/// Settings for the sync driver.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Hosts that both contribute and receive entries (`host:port`).
    pub sources: Vec<String>,
    /// Hosts that only receive entries.
    pub recipients: Vec<String>,
    /// Case-insensitive comment substring; empty disables filtering.
    pub filter: String,
    /// Pause between passes.
    pub interval: Duration,
    /// Compute and log deltas without pushing them.
    pub dry_run: bool,
    /// Root of the snapshot cache.
    pub cache_dir: PathBuf,
}

impl SyncConfig {
    /// Build and validate a configuration.
    ///
    /// Blank and repeated hosts are dropped before counting, keeping the
    /// first occurrence. A recipient that is also a source is only treated
    /// as a source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSources`] when no source is given and
    /// [`Error::NotEnoughSystems`] when fewer than two hosts are given in total.
    pub fn new(
        sources: Vec<String>,
        recipients: Vec<String>,
        filter: String,
        interval: Duration,
        dry_run: bool,
        cache_dir: PathBuf,
    ) -> Result<Self> {
        let sources = unique_hosts(sources, &[]);
        let recipients = unique_hosts(recipients, &sources);
        let config = Self {
            sources,
            recipients,
            filter,
            interval,
            dry_run,
            cache_dir,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the host counts.
    ///
    /// # Errors
    ///
    /// See [`SyncConfig::new`].
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(Error::NoSources);
        }
        let count = self.sources.len() + self.recipients.len();
        if count < 2 {
            return Err(Error::NotEnoughSystems { count });
        }
        Ok(())
    }

    /// Every configured host, sources first.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .chain(self.recipients.iter())
            .map(String::as_str)
    }
}

fn unique_hosts(hosts: Vec<String>, already: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(hosts.len());
    for host in hosts {
        let host = host.trim();
        if host.is_empty() {
            continue;
        }
        if unique.iter().chain(already).any(|h| h == host) {
            debug!(host, "Ignoring repeated host");
            continue;
        }
        unique.push(host.to_string());
    }
    unique
}

/// Default snapshot cache root: `~/.cache/safelist-sync`.
#[must_use]
pub fn default_cache_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".cache").join("safelist-sync"))
}

/// Resolve the snapshot cache root.
///
/// Priority:
/// 1. `explicit_path` (the `--cache-dir` flag, which clap also fills from
///    `SAFELIST_SYNC_CACHE_DIR`)
/// 2. `~/.cache/safelist-sync`
///
/// # Errors
///
/// Returns [`Error::Config`] if no home directory can be determined.
pub fn resolve_cache_dir(explicit_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(path.to_path_buf());
    }

    default_cache_dir().ok_or_else(|| {
        Error::Config(format!(
            "Cannot determine home directory; pass --cache-dir or set {CACHE_DIR_ENV}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn build(sources: &[&str], recipients: &[&str]) -> Result<SyncConfig> {
        SyncConfig::new(
            hosts(sources),
            hosts(recipients),
            String::new(),
            Duration::from_secs(DEFAULT_WAIT_SECS),
            false,
            PathBuf::from("/tmp/cache"),
        )
    }

    #[test]
    fn test_requires_a_source() {
        assert!(matches!(build(&[], &["r1:80", "r2:80"]), Err(Error::NoSources)));
    }

    #[test]
    fn test_requires_two_systems() {
        assert!(matches!(
            build(&["s1:80"], &[]),
            Err(Error::NotEnoughSystems { count: 1 })
        ));
    }

    #[test]
    fn test_source_and_recipient_is_enough() {
        let config = build(&["s1:80"], &["r1:80"]).unwrap();
        assert_eq!(config.hosts().collect::<Vec<_>>(), vec!["s1:80", "r1:80"]);
    }

    #[test]
    fn test_blank_hosts_are_ignored() {
        assert!(matches!(build(&["", " "], &["r1:80"]), Err(Error::NoSources)));
        assert!(matches!(
            build(&["s1:80", ""], &[]),
            Err(Error::NotEnoughSystems { count: 1 })
        ));
    }

    #[test]
    fn test_repeated_hosts_are_ignored() {
        let config = build(&["s1:80", "s2:80", "s1:80"], &["r1:80", "r1:80", " s2:80"]).unwrap();
        assert_eq!(config.sources, vec!["s1:80", "s2:80"]);
        assert_eq!(config.recipients, vec!["r1:80"]);

        assert!(matches!(
            build(&["s1:80", "s1:80"], &[]),
            Err(Error::NotEnoughSystems { count: 1 })
        ));
    }

    #[test]
    fn test_resolve_cache_dir_explicit() {
        let explicit = PathBuf::from("/custom/cache");
        assert_eq!(resolve_cache_dir(Some(&explicit)).unwrap(), explicit);
    }

    #[test]
    fn test_default_cache_dir() {
        let dir = default_cache_dir().unwrap();
        assert!(dir.ends_with(".cache/safelist-sync"));
    }
}

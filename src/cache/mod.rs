//! Per-host snapshot cache.
//!
//! After every pass the raw list fetched from each host is written to
//! `<root>/<host>.whitelist.json`. Snapshots exist for offline inspection
//! only; reconciliation never reads them back.
//!
//! Files are replaced atomically (write temp file, fsync, rename), so a
//! reader never sees a half-written snapshot. An empty or missing list is
//! never written: it usually means the fetch failed, and the previous
//! snapshot is more useful than nothing.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Entry;

/// File name suffix of a host snapshot.
pub const SNAPSHOT_SUFFIX: &str = ".whitelist.json";

/// Summary of one cached snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotInfo {
    pub host: String,
    pub path: PathBuf,
    /// Number of entries, or `None` if the file could not be parsed.
    pub entries: Option<usize>,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// Snapshot store rooted at one directory.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    root: PathBuf,
}

impl SnapshotCache {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot path for a host. The file need not exist.
    #[must_use]
    pub fn path_for(&self, host: &str) -> PathBuf {
        self.root.join(format!("{host}{SNAPSHOT_SUFFIX}"))
    }

    /// Record a host's list, skipping absent or empty lists.
    ///
    /// Returns whether a snapshot was written. Write failures go to the
    /// diagnostic channel and are otherwise ignored.
    pub fn store(&self, host: &str, entries: Option<&[Entry]>) -> bool {
        let Some(entries) = entries.filter(|e| !e.is_empty()) else {
            debug!(host, "Nothing to cache");
            return false;
        };

        match self.try_store(host, entries) {
            Ok(path) => {
                debug!(host, path = %path.display(), count = entries.len(), "Wrote cache file");
                true
            }
            Err(e) => {
                debug!(host, error = %e, "Problem writing cache file, skipping");
                false
            }
        }
    }

    /// Write a host's snapshot unconditionally.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn try_store(&self, host: &str, entries: &[Entry]) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(host);
        let content = serde_json::to_string_pretty(entries)?;
        atomic_write(&path, &content)?;
        Ok(path)
    }

    /// Read a host's snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SnapshotNotFound`] if there is no snapshot for the
    /// host, or an I/O or JSON error if it cannot be read.
    pub fn load(&self, host: &str) -> Result<Vec<Entry>> {
        let path = self.path_for(host);
        if !path.exists() {
            return Err(Error::SnapshotNotFound {
                host: host.to_string(),
                root: self.root.clone(),
            });
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// List every snapshot under the root, sorted by host.
    ///
    /// A missing root directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the root exists but cannot be read.
    pub fn list(&self) -> Result<Vec<SnapshotInfo>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let dir_entry = dir_entry?;
            let file_name = dir_entry.file_name();
            let Some(host) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(SNAPSHOT_SUFFIX))
            else {
                continue;
            };

            let metadata = dir_entry.metadata()?;
            let entries = self.load(host).ok().map(|list| list.len());
            snapshots.push(SnapshotInfo {
                host: host.to_string(),
                path: dir_entry.path(),
                entries,
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Local>::from),
            });
        }

        snapshots.sort_by(|a, b| a.host.cmp(&b.host));
        Ok(snapshots)
    }
}

/// Write content to a file atomically.
///
/// Writes to a sibling `.tmp` file, syncs it to disk, then renames it over
/// the target. If any step fails the original file remains untouched.
fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let temp_path = path.with_extension("json.tmp");

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn entries() -> Vec<Entry> {
        serde_json::from_value(json!([
            {"type": "ip", "comment": "resolver", "hash_key": -99999},
            {"type": "domain", "domain": "example.com", "hash_key": -99999},
        ]))
        .unwrap()
    }

    #[test]
    fn test_path_for() {
        let cache = SnapshotCache::new("/tmp/safelist");
        assert_eq!(
            cache.path_for("10.0.0.1:5000"),
            PathBuf::from("/tmp/safelist/10.0.0.1:5000.whitelist.json")
        );
    }

    #[test]
    fn test_store_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(temp_dir.path().join("nested").join("cache"));

        assert!(cache.store("h1:80", Some(&entries())));
        assert_eq!(cache.load("h1:80").unwrap(), entries());
        assert!(!cache.path_for("h1:80").with_extension("json.tmp").exists());
    }

    #[test]
    fn test_store_skips_empty_and_missing() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(temp_dir.path());

        assert!(!cache.store("h1:80", None));
        assert!(!cache.store("h2:80", Some(&[])));
        assert!(!cache.path_for("h1:80").exists());
        assert!(!cache.path_for("h2:80").exists());
    }

    #[test]
    fn test_empty_list_keeps_previous_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(temp_dir.path());

        assert!(cache.store("h1:80", Some(&entries())));
        assert!(!cache.store("h1:80", Some(&[])));
        assert_eq!(cache.load("h1:80").unwrap().len(), 2);
    }

    #[test]
    fn test_repeated_store_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(temp_dir.path());

        assert!(cache.store("h1:80", Some(&entries())));
        let one = &entries()[..1];
        assert!(cache.store("h1:80", Some(one)));
        assert_eq!(cache.load("h1:80").unwrap(), one.to_vec());
    }

    #[test]
    fn test_store_failure_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let cache = SnapshotCache::new(&blocker);
        assert!(!cache.store("h1:80", Some(&entries())));
    }

    #[test]
    fn test_load_missing() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(temp_dir.path());
        assert!(matches!(
            cache.load("nowhere:80"),
            Err(Error::SnapshotNotFound { .. })
        ));
    }

    #[test]
    fn test_list() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(temp_dir.path());

        cache.store("h2:80", Some(&entries()));
        cache.store("h1:80", Some(&entries()[..1]));
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let list = cache.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].host, "h1:80");
        assert_eq!(list[0].entries, Some(1));
        assert_eq!(list[1].host, "h2:80");
        assert_eq!(list[1].entries, Some(2));
        assert!(list[1].size > 0);
    }

    #[test]
    fn test_list_missing_root() {
        let cache = SnapshotCache::new("/nonexistent/safelist-sync-cache");
        assert!(cache.list().unwrap().is_empty());
    }
}

//! Sync driver: runs reconciliation passes on a fixed interval.
//!
//! ```text
//! Idle → Fetching → Filtering → Merging → Diffing → Pushing → Caching → Sleeping
//!            ↑                                                              │
//!            └──────────────────────────────────────────────────────────────┘
//!                                                   (shutdown) → Terminated
//! ```
//!
//! Hosts are handled one at a time. A host whose fetch fails simply drops
//! out of the pass: it contributes nothing, receives nothing and its
//! snapshot is left alone. The next pass is the retry. Shutdown is only
//! observed while sleeping, so a pass is never cut short.

use std::future::Future;

use serde::Serialize;
use tracing::{debug, info};

use super::{HostList, delta, filter_by_comment, merge};
use crate::cache::SnapshotCache;
use crate::config::SyncConfig;
use crate::model::Entry;
use crate::transport::Transport;

/// Where the driver is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    Fetching,
    Filtering,
    Merging,
    Diffing,
    Pushing,
    Caching,
    Sleeping,
    Terminated,
}

/// Whether a host feeds the canonical list or only receives from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Source,
    Recipient,
}

/// What happened to a host's delta this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushOutcome {
    /// The fetch failed; the host sat this pass out.
    NotFetched,
    /// Nothing was missing.
    UpToDate,
    /// Dry-run mode: the delta was computed but not sent.
    DryRun,
    /// The host accepted the delta.
    Pushed,
    /// The host did not accept the delta.
    Failed,
}

/// Per-host result of a pass.
#[derive(Debug, Clone, Serialize)]
pub struct HostOutcome {
    pub host: String,
    pub role: Role,
    /// Size of the raw fetched list, if the fetch succeeded.
    pub fetched: Option<usize>,
    /// Entries the host was missing after filtering.
    pub missing: usize,
    pub push: PushOutcome,
    pub cached: bool,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    /// Size of the canonical list.
    pub canonical: usize,
    pub hosts: Vec<HostOutcome>,
}

impl PassReport {
    /// Outcome for one host, sources before recipients.
    #[must_use]
    pub fn host(&self, host: &str) -> Option<&HostOutcome> {
        self.hosts.iter().find(|h| h.host == host)
    }

    /// Number of hosts that accepted a push.
    #[must_use]
    pub fn pushed(&self) -> usize {
        self.hosts
            .iter()
            .filter(|h| h.push == PushOutcome::Pushed)
            .count()
    }
}

/// Reconciles the configured hosts through a [`Transport`].
pub struct Syncer<T> {
    config: SyncConfig,
    transport: T,
    cache: SnapshotCache,
    state: SyncState,
    passes: u64,
}

impl<T: Transport> Syncer<T> {
    /// Create a driver; the snapshot cache lives under `config.cache_dir`.
    pub fn new(config: SyncConfig, transport: T) -> Self {
        let cache = SnapshotCache::new(config.cache_dir.clone());
        Self {
            config,
            transport,
            cache,
            state: SyncState::Idle,
            passes: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Completed passes.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run passes until `shutdown` completes.
    ///
    /// `shutdown` is only polled between passes, while sleeping.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut shutdown = std::pin::pin!(shutdown);

        loop {
            let report = self.run_pass().await;
            info!(
                pass = self.passes,
                canonical = report.canonical,
                pushed = report.pushed(),
                "Pass complete"
            );

            self.state = SyncState::Sleeping;
            debug!(seconds = self.config.interval.as_secs(), "Sleeping");
            tokio::select! {
                () = tokio::time::sleep(self.config.interval) => {}
                () = &mut shutdown => {
                    info!("Shutdown requested, exiting");
                    self.state = SyncState::Terminated;
                    return;
                }
            }
        }
    }

    /// Run one reconciliation pass.
    pub async fn run_pass(&mut self) -> PassReport {
        debug!(pass = self.passes + 1, "Starting sync");

        self.state = SyncState::Fetching;
        let raw_sources = self.fetch_all(&self.config.sources).await;
        let raw_recipients = self.fetch_all(&self.config.recipients).await;

        self.state = SyncState::Filtering;
        let sources = filter_by_comment(&raw_sources, &self.config.filter);
        let recipients = filter_by_comment(&raw_recipients, &self.config.filter);

        self.state = SyncState::Merging;
        let canonical = merge(&sources);
        debug!(count = canonical.len(), "Canonical list merged");

        self.state = SyncState::Diffing;
        let deltas: Vec<(Role, &HostList, Vec<Entry>)> = sources
            .iter()
            .map(|list| (Role::Source, list))
            .chain(recipients.iter().map(|list| (Role::Recipient, list)))
            .map(|(role, list)| (role, list, delta(&canonical, &list.entries)))
            .collect();

        self.state = SyncState::Pushing;
        let mut hosts = Vec::new();
        for (role, list, missing) in &deltas {
            let push = self.push_delta(&list.host, missing).await;
            hosts.push(HostOutcome {
                host: list.host.clone(),
                role: *role,
                fetched: None,
                missing: missing.len(),
                push,
                cached: false,
            });
        }

        self.state = SyncState::Caching;
        for raw in raw_sources.iter().chain(raw_recipients.iter()) {
            let cached = self.cache.store(&raw.host, Some(&raw.entries));
            if let Some(outcome) = hosts.iter_mut().find(|h| h.host == raw.host) {
                outcome.fetched = Some(raw.entries.len());
                outcome.cached = cached;
            }
        }

        for (role, configured) in [
            (Role::Source, &self.config.sources),
            (Role::Recipient, &self.config.recipients),
        ] {
            for host in configured {
                if !hosts.iter().any(|h| &h.host == host) {
                    hosts.push(HostOutcome {
                        host: host.clone(),
                        role,
                        fetched: None,
                        missing: 0,
                        push: PushOutcome::NotFetched,
                        cached: false,
                    });
                }
            }
        }

        self.passes += 1;
        PassReport {
            canonical: canonical.len(),
            hosts,
        }
    }

    async fn fetch_all(&self, hosts: &[String]) -> Vec<HostList> {
        let mut lists = Vec::with_capacity(hosts.len());
        for host in hosts {
            match self.transport.fetch(host).await {
                Some(entries) => {
                    debug!(host = %host, count = entries.len(), "Safelist fetched");
                    lists.push(HostList::new(host.clone(), entries));
                }
                None => debug!(host = %host, "No safelist returned"),
            }
        }
        lists
    }

    async fn push_delta(&self, host: &str, missing: &[Entry]) -> PushOutcome {
        if missing.is_empty() {
            debug!(host, "No changes needed");
            return PushOutcome::UpToDate;
        }

        debug!(host, count = missing.len(), "Unique changes to send");
        if self.config.dry_run {
            debug!(host, "Changes will not be sent (dry-run mode)");
            return PushOutcome::DryRun;
        }

        if self.transport.push(host, missing).await {
            PushOutcome::Pushed
        } else {
            PushOutcome::Failed
        }
    }
}

//! File-sourced IP access control list.
//!
//! # Responsibilities
//! - Load allowed IPs from a plain-text file, one address per line
//! - Re-read the file on a timer when its modification time advances
//! - Answer per-request membership checks
//!
//! # Design Decisions
//! - Refresh only adds: an address once admitted stays admitted until restart
//! - A failed refresh keeps the last loaded set
//! - Loopback peers always pass
//! - Readers load an `Arc` snapshot; only the refresher swaps it

use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use arc_swap::ArcSwap;
use tokio::sync::broadcast;

use crate::observability::metrics;

/// Lines shorter than this cannot hold an address and are skipped.
const MIN_LINE_LEN: usize = 7;

/// Result of one [`AccessControlList::refresh`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No source file configured; nothing to do.
    Disabled,
    /// Modification time not newer than the last load; file not read.
    Unchanged,
    /// File read; `added` addresses were new to the set.
    Loaded { added: usize },
    /// The file could not be read; previous set kept.
    Failed,
}

#[derive(Debug)]
pub struct AccessControlList {
    enabled: bool,
    path: PathBuf,
    last_modified: Mutex<Option<SystemTime>>,
    ips: ArcSwap<HashSet<IpAddr>>,
}

impl AccessControlList {
    /// An empty path disables the list. The file is loaded once immediately.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let acl = Self {
            enabled: !path.as_os_str().is_empty(),
            path,
            last_modified: Mutex::new(None),
            ips: ArcSwap::from_pointee(HashSet::new()),
        };
        acl.refresh();
        acl
    }

    pub fn disabled() -> Self {
        Self::new(PathBuf::new())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.ips.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.load().is_empty()
    }

    /// Re-read the source file if it changed since the last load.
    pub fn refresh(&self) -> RefreshOutcome {
        if !self.enabled {
            return RefreshOutcome::Disabled;
        }

        let mut last_modified = match self.last_modified.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let modified = match std::fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Cannot stat ACL file");
                return RefreshOutcome::Failed;
            }
        };
        if last_modified.is_some_and(|seen| modified <= seen) {
            return RefreshOutcome::Unchanged;
        }
        *last_modified = Some(modified);

        let loaded = match read_addresses(&self.path) {
            Ok(ips) => ips,
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Cannot read ACL file");
                return RefreshOutcome::Failed;
            }
        };

        let current = self.ips.load_full();
        let mut merged = HashSet::clone(&current);
        let before = merged.len();
        merged.extend(loaded);
        let added = merged.len() - before;

        tracing::info!(path = ?self.path, added, total = merged.len(), "ACL loaded");
        metrics::record_acl_entries(merged.len());
        self.ips.store(Arc::new(merged));

        RefreshOutcome::Loaded { added }
    }

    /// True when the list is disabled, the peer is localhost, or the peer was loaded.
    /// Only `127.0.0.1` and `::1` count as localhost; the rest of `127.0.0.0/8` is checked.
    pub fn check(&self, peer: IpAddr) -> bool {
        let peer = peer.to_canonical();
        if !self.enabled || is_localhost(peer) {
            return true;
        }
        self.ips.load().contains(&peer)
    }
}

/// Periodically refresh `acl` until shutdown. The file is read on the
/// blocking pool since resolving host names may hit DNS.
pub fn spawn_refresher(
    acl: Arc<AccessControlList>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !acl.is_enabled() {
            tracing::info!("ACL disabled, refresher not started");
            return;
        }
        tracing::info!(
            path = ?acl.path(),
            interval_ms = interval.as_millis() as u64,
            "ACL refresher started"
        );

        let mut ticker = tokio::time::interval(interval);
        // the first tick completes immediately; the constructor already loaded
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let acl = Arc::clone(&acl);
                    if let Err(e) = tokio::task::spawn_blocking(move || acl.refresh()).await {
                        tracing::error!(error = %e, "ACL refresh task failed");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("ACL refresher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    })
}

fn is_localhost(ip: IpAddr) -> bool {
    ip == IpAddr::V4(Ipv4Addr::LOCALHOST) || ip == IpAddr::V6(Ipv6Addr::LOCALHOST)
}

fn read_addresses(path: &Path) -> std::io::Result<Vec<IpAddr>> {
    let file = std::fs::File::open(path)?;
    let mut ips = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if line.len() < MIN_LINE_LEN {
            continue;
        }
        match resolve(line) {
            Some(ip) => ips.push(ip),
            None => tracing::debug!(entry = %line, "Skipping unresolvable ACL entry"),
        }
    }
    Ok(ips)
}

/// Accepts `ip`, `ip:port`, `[v6]:port`, `host` and `host:port`.
fn resolve(entry: &str) -> Option<IpAddr> {
    if let Ok(ip) = entry.parse::<IpAddr>() {
        return Some(ip.to_canonical());
    }
    if let Ok(addr) = entry.parse::<SocketAddr>() {
        return Some(addr.ip().to_canonical());
    }
    let with_port = if entry.contains(':') {
        entry.to_string()
    } else {
        format!("{}:0", entry)
    };
    with_port
        .to_socket_addrs()
        .ok()?
        .next()
        .map(|a| a.ip().to_canonical())
}

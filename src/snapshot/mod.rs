// src/snapshot/mod.rs

//! Point-in-time snapshots and the relatime primer.
//!
//! [`times`] carries the nanosecond timestamp model, [`store`] the ordered
//! baseline map plus the atime-rewrite that defeats relatime, and
//! [`AuditSession`] ties one resolve/prime/re-read cycle together.

pub mod store;
pub mod times;

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::classify::{Change, ChangeEvent, classify};
use crate::resolve::WatchSet;
use crate::snapshot::store::{FileState, SnapshotStore};

pub use store::{PRIME_MARGIN_SECS, prime};
pub use times::{FsInstant, Stamp};

/// One audit window: baseline snapshots taken before the watched command,
/// compared against a fresh read afterwards.
///
/// The session owns its store exclusively; nothing persists past
/// [`AuditSession::finish`]. Coordination with whatever ran in between
/// happens only through on-disk metadata, so the post-read never trusts
/// anything captured before the command ran except the baseline itself.
#[derive(Debug)]
pub struct AuditSession {
    watch: WatchSet,
    store: SnapshotStore,
}

impl AuditSession {
    /// Resolve the watch set, snapshot every path, and prime atimes.
    ///
    /// Must be called before the audited command starts.
    pub fn begin(watch: WatchSet) -> Result<Self> {
        let paths = watch.resolve();
        debug!(count = paths.len(), "resolved watch set");
        let store = SnapshotStore::capture(paths);
        info!(count = store.len(), "baseline snapshot captured");
        Ok(Self { watch, store })
    }

    /// The paths captured in the baseline, in path order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.store.paths().map(PathBuf::from).collect()
    }

    /// Re-resolve, re-read, and classify every path.
    ///
    /// Must not be called until the audited command has fully exited. Paths
    /// discovered only now (created during the window) classify against an
    /// absent baseline; the output is the path-ordered sequence of
    /// non-UNCHANGED events.
    pub fn finish(self) -> Result<Vec<ChangeEvent>> {
        let mut candidates: BTreeSet<PathBuf> =
            self.store.paths().map(PathBuf::from).collect();
        candidates.extend(self.watch.resolve());

        let mut events = Vec::new();
        for path in candidates {
            let baseline = self.store.get(&path).unwrap_or(FileState::Absent);
            let current = SnapshotStore::observe(&path);
            let change = classify(baseline, current);
            if change != Change::Unchanged {
                events.push(ChangeEvent { path, change });
            }
        }

        debug!(count = events.len(), "classification complete");
        Ok(events)
    }
}

// src/snapshot/store.rs

use std::collections::BTreeMap;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::snapshot::times::Stamp;

/// Seconds by which a primed atime sits behind its mtime.
///
/// One full day meets relatime's staleness threshold, so whichever relatime
/// branch the kernel takes, the next read of a primed file advances atime.
pub const PRIME_MARGIN_SECS: i64 = 86_400;

/// Observed state of one watched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// The path could not be stat'ed (usually: it does not exist).
    Absent,
    Present(Stamp),
}

/// Ordered baseline snapshot, keyed by path.
///
/// Owned by one audit run and discarded at its end; nothing persists across
/// invocations. The key space is fixed at capture time: paths that appear
/// later are classified against an `Absent` baseline, never merged in.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    entries: BTreeMap<PathBuf, FileState>,
}

impl SnapshotStore {
    /// Stat and prime every path, recording the resulting baseline.
    ///
    /// A path resolved more than once (overlapping patterns) is captured
    /// once; the map coalesces duplicates. A failure to prime is logged and
    /// the observed stamp is kept instead -- ACCESSED detection for that path
    /// silently degrades for this run.
    pub fn capture<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut entries = BTreeMap::new();

        for path in paths {
            if entries.contains_key(&path) {
                continue;
            }
            let state = match Self::observe(&path) {
                FileState::Present(stamp) => match prime(&path, stamp) {
                    Ok(primed) => FileState::Present(primed),
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "could not prime atime");
                        FileState::Present(stamp)
                    }
                },
                FileState::Absent => {
                    debug!(path = %path.display(), "watched path absent at capture");
                    FileState::Absent
                }
            };
            entries.insert(path, state);
        }

        Self { entries }
    }

    /// Read the current state of a path straight from the filesystem.
    ///
    /// Always a fresh stat; baseline state is never consulted or cached here.
    pub fn observe(path: &Path) -> FileState {
        match fs::metadata(path) {
            Ok(meta) => FileState::Present(Stamp::of(&meta)),
            Err(_) => FileState::Absent,
        }
    }

    /// Baseline for a path, if it was part of the capture.
    pub fn get(&self, path: &Path) -> Option<FileState> {
        self.entries.get(path).copied()
    }

    /// All captured paths, in path order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rewrite `path`'s atime to sit `PRIME_MARGIN_SECS` behind its mtime,
/// leaving mtime bit-for-bit untouched.
///
/// Returns the stamp as it stands after priming. A baseline whose atime is
/// already at or behind the margin is left alone, so re-priming is a no-op.
pub fn prime(path: &Path, observed: Stamp) -> io::Result<Stamp> {
    let target = observed.mtime.minus_secs(PRIME_MARGIN_SECS);
    if observed.atime <= target {
        return Ok(observed);
    }

    // FileTimes leaves the unset field (mtime) unchanged: the kernel sees
    // UTIME_OMIT for it rather than a re-written copy.
    let file = File::open(path)?;
    file.set_times(FileTimes::new().set_accessed(target.to_system_time()))?;

    Ok(Stamp {
        atime: target,
        mtime: observed.mtime,
    })
}

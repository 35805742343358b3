// src/snapshot/times.rs

//! Nanosecond-resolution file timestamps.
//!
//! Comparisons are lexicographic on (seconds, nanoseconds): nanoseconds only
//! break ties when the seconds are equal. Filesystems with coarser resolution
//! are expected to pad with zeroes, which the derived ordering handles.

use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// One filesystem timestamp.
///
/// Field order matters: the derived `Ord` compares `secs` first and `nanos`
/// only on equal seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FsInstant {
    pub secs: i64,
    pub nanos: u32,
}

impl FsInstant {
    /// Last access time of `meta`.
    pub fn atime_of(meta: &Metadata) -> Self {
        Self {
            secs: meta.atime(),
            nanos: meta.atime_nsec() as u32,
        }
    }

    /// Last modification time of `meta`.
    pub fn mtime_of(meta: &Metadata) -> Self {
        Self {
            secs: meta.mtime(),
            nanos: meta.mtime_nsec() as u32,
        }
    }

    /// The same instant shifted `secs` seconds into the past, nanoseconds
    /// preserved.
    pub fn minus_secs(self, secs: i64) -> Self {
        Self {
            secs: self.secs - secs,
            nanos: self.nanos,
        }
    }

    /// Convert to `SystemTime` for handing to `std::fs::FileTimes`.
    pub fn to_system_time(self) -> SystemTime {
        if self.secs >= 0 {
            UNIX_EPOCH + Duration::new(self.secs as u64, self.nanos)
        } else {
            UNIX_EPOCH - Duration::from_secs(self.secs.unsigned_abs())
                + Duration::from_nanos(u64::from(self.nanos))
        }
    }
}

/// A captured (atime, mtime) pair for one path at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub atime: FsInstant,
    pub mtime: FsInstant,
}

impl Stamp {
    pub fn of(meta: &Metadata) -> Self {
        Self {
            atime: FsInstant::atime_of(meta),
            mtime: FsInstant::mtime_of(meta),
        }
    }
}

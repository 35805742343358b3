// src/classify.rs

//! Pure classification of (baseline, current) state pairs.
//!
//! No hidden state and no ordering dependency between paths: every
//! classification is a function of exactly one path's two snapshots.

use std::fmt;
use std::path::PathBuf;

use crate::snapshot::store::FileState;

/// What happened to one watched path during the audited window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Created,
    Modified,
    Accessed,
    Removed,
    Unchanged,
}

impl Change {
    pub fn label(self) -> &'static str {
        match self {
            Change::Created => "CREATED",
            Change::Modified => "MODIFIED",
            Change::Accessed => "ACCESSED",
            Change::Removed => "REMOVED",
            Change::Unchanged => "UNCHANGED",
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One non-trivial classification, bound to its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub change: Change,
}

/// Derive the change for one path.
///
/// Tie-break: a path both written and read in the window reports only
/// MODIFIED -- the mtime comparison runs first and subsumes the read.
pub fn classify(baseline: FileState, current: FileState) -> Change {
    match (baseline, current) {
        (FileState::Absent, FileState::Absent) => Change::Unchanged,
        (FileState::Present(_), FileState::Absent) => Change::Removed,
        (FileState::Absent, FileState::Present(_)) => Change::Created,
        (FileState::Present(before), FileState::Present(after)) => {
            if after.mtime > before.mtime {
                Change::Modified
            } else if after.atime > before.atime {
                Change::Accessed
            } else {
                Change::Unchanged
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::snapshot::times::{FsInstant, Stamp};

    fn present(atime: (i64, u32), mtime: (i64, u32)) -> FileState {
        FileState::Present(Stamp {
            atime: FsInstant { secs: atime.0, nanos: atime.1 },
            mtime: FsInstant { secs: mtime.0, nanos: mtime.1 },
        })
    }

    #[test]
    fn absent_then_present_is_created() {
        assert_eq!(
            classify(FileState::Absent, present((10, 0), (10, 0))),
            Change::Created
        );
    }

    #[test]
    fn present_then_absent_is_removed() {
        assert_eq!(
            classify(present((10, 0), (10, 0)), FileState::Absent),
            Change::Removed
        );
    }

    #[test]
    fn absent_both_sides_is_unchanged() {
        assert_eq!(classify(FileState::Absent, FileState::Absent), Change::Unchanged);
    }

    #[test]
    fn advanced_mtime_is_modified() {
        assert_eq!(
            classify(present((5, 0), (10, 0)), present((5, 0), (11, 0))),
            Change::Modified
        );
    }

    #[test]
    fn advanced_atime_alone_is_accessed() {
        assert_eq!(
            classify(present((5, 0), (10, 0)), present((12, 0), (10, 0))),
            Change::Accessed
        );
    }

    #[test]
    fn write_subsumes_read() {
        // Both timestamps advanced: the read is not reported separately.
        assert_eq!(
            classify(present((5, 0), (10, 0)), present((12, 0), (11, 0))),
            Change::Modified
        );
    }

    #[test]
    fn untouched_stamps_are_unchanged() {
        let s = present((5, 3), (10, 7));
        assert_eq!(classify(s, s), Change::Unchanged);
    }

    #[test]
    fn nanoseconds_break_second_ties() {
        assert_eq!(
            classify(present((5, 0), (10, 1)), present((5, 0), (10, 2))),
            Change::Modified
        );
        assert_eq!(
            classify(present((5, 1), (10, 0)), present((5, 2), (10, 0))),
            Change::Accessed
        );
    }

    proptest! {
        /// Any strict mtime advance classifies as MODIFIED no matter what
        /// happened to atime.
        #[test]
        fn mtime_advance_always_wins(
            a0 in 0i64..1_000_000, an0 in 0u32..1_000_000_000,
            a1 in 0i64..1_000_000, an1 in 0u32..1_000_000_000,
            m in 0i64..1_000_000, mn in 0u32..999_999_999,
        ) {
            let before = present((a0, an0), (m, mn));
            let after = present((a1, an1), (m, mn + 1));
            prop_assert_eq!(classify(before, after), Change::Modified);
        }

        /// With mtime pinned, classification is ACCESSED iff atime strictly
        /// advanced.
        #[test]
        fn atime_alone_decides_accessed(
            a0 in 0i64..1_000_000, an0 in 0u32..1_000_000_000,
            a1 in 0i64..1_000_000, an1 in 0u32..1_000_000_000,
            m in 0i64..1_000_000, mn in 0u32..1_000_000_000,
        ) {
            let before = present((a0, an0), (m, mn));
            let after = present((a1, an1), (m, mn));
            let advanced = (a1, an1) > (a0, an0);
            let expected = if advanced { Change::Accessed } else { Change::Unchanged };
            prop_assert_eq!(classify(before, after), expected);
        }
    }
}

// src/resolve/mod.rs

//! Path resolution: turning the configuration surface (delimiter-separated
//! glob patterns or root directories) into the concrete set of paths to
//! watch.
//!
//! Two interchangeable strategies:
//! - [`patterns`]: expand glob patterns against a base directory, keeping
//!   unmatched patterns pending.
//! - [`walk`]: enumerate regular files under root directories for
//!   whole-subtree audits.

pub mod patterns;
pub mod walk;

use std::collections::BTreeSet;
use std::path::PathBuf;

pub use patterns::{WatchPatterns, parse_list};
pub use walk::{DEFAULT_EXCLUDES, TreeWalk};

/// The resolved watch strategy for one audit run.
///
/// Resolution is repeatable: the session re-resolves after the audited
/// command exits so that newly created files matching the patterns are seen.
#[derive(Debug)]
pub enum WatchSet {
    Patterns(WatchPatterns),
    Trees(TreeWalk),
}

impl WatchSet {
    /// Expand to the set of candidate paths as the filesystem stands now.
    pub fn resolve(&self) -> BTreeSet<PathBuf> {
        match self {
            WatchSet::Patterns(patterns) => patterns.resolve(),
            WatchSet::Trees(walk) => walk.resolve(),
        }
    }
}

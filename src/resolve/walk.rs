// src/resolve/walk.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::warn;

use crate::errors::AuditError;
use crate::resolve::patterns::normalize;

/// Name patterns never worth auditing: VCS metadata and editor swap files.
pub const DEFAULT_EXCLUDES: &[&str] = &[".git", ".svn", ".hg", "*.swp", "*.swo", "*~"];

/// Recursive enumeration of regular files under one or more root
/// directories, used for whole-subtree audits and prerequisite inference.
///
/// The walk never crosses mount points. Excludes match by entry name, so an
/// excluded directory is pruned wholesale.
#[derive(Debug)]
pub struct TreeWalk {
    roots: Vec<PathBuf>,
    exclude: GlobSet,
}

impl TreeWalk {
    /// Build a walker over `roots` with the default excludes plus
    /// `extra_excludes`. Every root must be an existing directory.
    pub fn new(roots: Vec<PathBuf>, extra_excludes: &[String]) -> Result<Self, AuditError> {
        for root in &roots {
            if !root.is_dir() {
                return Err(AuditError::BadAuditRoot(root.clone()));
            }
        }

        let mut builder = GlobSetBuilder::new();
        for text in DEFAULT_EXCLUDES
            .iter()
            .map(|s| (*s).to_string())
            .chain(extra_excludes.iter().cloned())
        {
            let glob = Glob::new(&text).map_err(|source| AuditError::Pattern {
                pattern: text.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let exclude = builder.build().map_err(|source| AuditError::Pattern {
            pattern: "<exclude set>".to_string(),
            source,
        })?;

        Ok(Self { roots, exclude })
    }

    /// Enumerate all regular files under the roots as they stand right now.
    ///
    /// Unreadable entries are logged and skipped; a vanished subtree is not
    /// an error at this layer.
    pub fn resolve(&self) -> BTreeSet<PathBuf> {
        let mut out = BTreeSet::new();

        for root in &self.roots {
            let exclude = self.exclude.clone();
            let walker = WalkBuilder::new(root)
                .standard_filters(false)
                .same_file_system(true)
                .filter_entry(move |entry| !exclude.is_match(Path::new(entry.file_name())))
                .build();

            for entry in walker {
                match entry {
                    Ok(e) if e.file_type().is_some_and(|t| t.is_file()) => {
                        out.insert(normalize(e.path()));
                    }
                    Ok(_) => {}
                    Err(err) => warn!(root = %root.display(), error = %err, "walk error"),
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_root_is_fatal() {
        let err = TreeWalk::new(vec![PathBuf::from("/no/such/dir")], &[]).unwrap_err();
        assert!(matches!(err, AuditError::BadAuditRoot(_)));
    }

    #[test]
    fn enumerates_regular_files_only() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        fs::create_dir(dir.path().join("sub"))?;
        fs::write(dir.path().join("sub/b.txt"), "b")?;

        let walk = TreeWalk::new(vec![dir.path().to_path_buf()], &[])?;
        let paths = walk.resolve();
        assert!(paths.contains(&dir.path().join("a.txt")));
        assert!(paths.contains(&dir.path().join("sub/b.txt")));
        assert!(!paths.contains(&dir.path().join("sub")));
        Ok(())
    }

    #[test]
    fn default_excludes_prune_vcs_and_swap_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join(".git"))?;
        fs::write(dir.path().join(".git/config"), "")?;
        fs::write(dir.path().join("main.c.swp"), "")?;
        fs::write(dir.path().join("main.c"), "")?;

        let walk = TreeWalk::new(vec![dir.path().to_path_buf()], &[])?;
        let paths = walk.resolve();
        assert_eq!(paths.len(), 1);
        assert!(paths.contains(&dir.path().join("main.c")));
        Ok(())
    }

    #[test]
    fn extra_excludes_match_by_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("keep.c"), "")?;
        fs::write(dir.path().join("build.d"), "")?;

        let walk = TreeWalk::new(
            vec![dir.path().to_path_buf()],
            &["build.d".to_string()],
        )?;
        let paths = walk.resolve();
        assert!(paths.contains(&dir.path().join("keep.c")));
        assert!(!paths.contains(&dir.path().join("build.d")));
        Ok(())
    }
}

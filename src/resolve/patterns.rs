// src/resolve/patterns.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use tracing::debug;

use crate::errors::AuditError;

/// Split a delimiter-separated list into its non-empty items.
pub fn parse_list(list: &str, sep: char) -> Vec<String> {
    list.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn has_meta(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

/// One watch pattern: a compiled glob, or a literal path when the text
/// carries no glob metacharacters.
#[derive(Debug)]
struct Pattern {
    text: String,
    matcher: Option<GlobMatcher>,
}

/// A compiled set of watch patterns rooted at a base directory.
///
/// Patterns are kept for the lifetime of a run and re-expanded on demand, so
/// a pattern that matches nothing at capture time stays pending: files that
/// come into existence later are picked up by the post-run expansion and
/// classified as CREATED. Overlapping patterns coalesce; a path matched by
/// two patterns is resolved once.
#[derive(Debug)]
pub struct WatchPatterns {
    entries: Vec<Pattern>,
    base: PathBuf,
}

impl WatchPatterns {
    /// Compile `patterns` relative to `base`. A malformed pattern is a fatal
    /// setup error.
    pub fn compile(patterns: &[String], base: impl Into<PathBuf>) -> Result<Self, AuditError> {
        let mut entries = Vec::with_capacity(patterns.len());

        for text in patterns {
            let matcher = if has_meta(text) {
                let glob = GlobBuilder::new(text)
                    .literal_separator(true)
                    .build()
                    .map_err(|source| AuditError::Pattern {
                        pattern: text.clone(),
                        source,
                    })?;
                Some(glob.compile_matcher())
            } else {
                None
            };
            entries.push(Pattern {
                text: text.clone(),
                matcher,
            });
        }

        Ok(Self {
            entries,
            base: base.into(),
        })
    }

    /// Expand every pattern against the filesystem as it stands right now.
    ///
    /// Literal paths are always included, present or not -- an absent literal
    /// is the pending entry whose later appearance means CREATED.
    pub fn resolve(&self) -> BTreeSet<PathBuf> {
        let mut out = BTreeSet::new();
        for pattern in &self.entries {
            match &pattern.matcher {
                None => {
                    out.insert(self.literal_path(&pattern.text));
                }
                Some(matcher) => self.expand(&pattern.text, matcher, &mut out),
            }
        }
        out
    }

    fn literal_path(&self, text: &str) -> PathBuf {
        let p = Path::new(text);
        if p.is_absolute() || self.base == Path::new(".") {
            p.to_path_buf()
        } else {
            self.base.join(p)
        }
    }

    fn expand(&self, text: &str, matcher: &GlobMatcher, out: &mut BTreeSet<PathBuf>) {
        let (root, depth) = self.walk_bounds(text);
        let absolute = Path::new(text).is_absolute();

        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(false)
            .same_file_system(true)
            .max_depth(depth);

        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    debug!(pattern = %text, error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            let candidate: &Path = if absolute {
                path
            } else {
                match path.strip_prefix(&self.base) {
                    Ok(rel) if !rel.as_os_str().is_empty() => rel,
                    _ => continue,
                }
            };
            if matcher.is_match(candidate) {
                out.insert(normalize(path));
            }
        }
    }

    /// Where to start walking for a pattern, and how deep. The walk starts at
    /// the literal component prefix; depth is bounded by the remaining
    /// component count unless the pattern contains `**`.
    fn walk_bounds(&self, text: &str) -> (PathBuf, Option<usize>) {
        let pat = Path::new(text);
        let mut prefix = PathBuf::new();
        let mut tail = 0usize;

        for comp in pat.components() {
            let lit = comp.as_os_str().to_string_lossy();
            if tail > 0 || has_meta(&lit) {
                tail += 1;
            } else {
                prefix.push(comp);
            }
        }

        let root = if pat.is_absolute() {
            if prefix.as_os_str().is_empty() {
                PathBuf::from("/")
            } else {
                prefix
            }
        } else if prefix.as_os_str().is_empty() {
            self.base.clone()
        } else {
            self.base.join(prefix)
        };

        let depth = if text.contains("**") {
            None
        } else {
            Some(tail.max(1))
        };

        (root, depth)
    }
}

/// Drop a leading `./` so reports read the way the pattern was written.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    path.strip_prefix(".")
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

// src/deps.rs

//! Build-dependency inference over the classifier's output.
//!
//! A path is a prerequisite iff its classification is exactly ACCESSED:
//! mtime unchanged, atime strictly advanced. Anything written during the
//! window (CREATED or MODIFIED) was produced by the command, not consumed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::classify::{Change, ChangeEvent};
use crate::errors::AuditError;
use crate::snapshot::store::{FileState, SnapshotStore, prime};

/// Select the prerequisite set: ACCESSED paths, already in path order.
pub fn prerequisites(events: &[ChangeEvent]) -> Vec<PathBuf> {
    events
        .iter()
        .filter(|e| e.change == Change::Accessed)
        .map(|e| e.path.clone())
        .collect()
}

/// Verify that reads under `dir` actually advance atime.
///
/// Creates a throwaway probe file, backdates its atime behind its mtime the
/// same way the primer does, reads it, and checks that atime moved past
/// mtime. A filesystem that fails this check (noatime mounts, caching NFS
/// clients) would silently yield an empty prerequisite set, so the whole run
/// fails fast instead.
pub fn self_check(dir: &Path) -> Result<(), AuditError> {
    let probe = dir.join(format!(".fsaudit-{}.probe", std::process::id()));
    let outcome = probe_atime_updates(&probe);
    let _ = fs::remove_file(&probe);

    match outcome {
        Ok(true) => {
            debug!(dir = %dir.display(), "atime self-check passed");
            Ok(())
        }
        Ok(false) => Err(AuditError::AtimesUnsupported(dir.to_path_buf())),
        Err(err) => Err(AuditError::Io(err)),
    }
}

fn probe_atime_updates(probe: &Path) -> io::Result<bool> {
    fs::write(probe, b"fsaudit atime probe\n")?;

    let observed = match SnapshotStore::observe(probe) {
        FileState::Present(stamp) => stamp,
        FileState::Absent => return Ok(false),
    };
    let primed = prime(probe, observed)?;

    let _ = fs::read(probe)?;

    let after = match SnapshotStore::observe(probe) {
        FileState::Present(stamp) => stamp,
        FileState::Absent => return Ok(false),
    };

    Ok(after.atime > primed.atime && after.atime > after.mtime)
}

/// Open (and truncate) the depsfile before the audited command runs, so an
/// unusable destination aborts the run up front.
pub fn open_output(path: &Path) -> Result<File, AuditError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|source| AuditError::Output {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the final rule, or delete the artifact when nothing was read.
///
/// An empty rule would only mislead a build tool, so with zero prerequisites
/// any previously existing depsfile is removed instead.
pub fn finalize_depsfile(
    path: &Path,
    mut file: File,
    prereqs: &[PathBuf],
) -> Result<(), AuditError> {
    if prereqs.is_empty() {
        drop(file);
        match fs::remove_file(path) {
            Ok(()) => info!(path = %path.display(), "no prerequisites; removed depsfile"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(AuditError::Output {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
        return Ok(());
    }

    let stem = path.with_extension("");
    let text = render_rule(&stem.display().to_string(), prereqs);
    file.write_all(text.as_bytes())
        .map_err(|source| AuditError::Output {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), count = prereqs.len(), "wrote depsfile");
    Ok(())
}

/// Render a make-style rule fragment:
///
/// ```text
/// stem: \
///   dep1 \
///   dep2
///
/// dep1:
///
/// dep2:
/// ```
///
/// The trailing empty rules keep `make` from failing when a prerequisite is
/// later deleted.
pub fn render_rule(stem: &str, prereqs: &[PathBuf]) -> String {
    let mut out = format!("{stem}: \\\n");
    for (i, p) in prereqs.iter().enumerate() {
        let eol = if i + 1 < prereqs.len() { " \\\n" } else { "\n" };
        out.push_str(&format!("  {}{}", p.display(), eol));
    }
    for p in prereqs {
        out.push_str(&format!("\n{}:\n", p.display()));
    }
    out
}

/// Render one prerequisite path per line.
pub fn render_plain(prereqs: &[PathBuf]) -> String {
    let mut out = String::new();
    for p in prereqs {
        out.push_str(&format!("{}\n", p.display()));
    }
    out
}

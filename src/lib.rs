// src/lib.rs

pub mod classify;
pub mod cli;
pub mod deps;
pub mod errors;
pub mod exec;
pub mod hooks;
pub mod logging;
pub mod report;
pub mod resolve;
pub mod snapshot;

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::hooks::{Collaborator, TimingReporter};
use crate::resolve::{TreeWalk, WatchPatterns, WatchSet, parse_list};
use crate::snapshot::AuditSession;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - path resolution (glob patterns or tree roots)
/// - snapshot capture and relatime priming
/// - the audited command
/// - classification and reporting / dependency inference
///
/// Returns the exit code to propagate: always the audited command's own,
/// orthogonal to any change-detection outcome.
pub fn run(args: CliArgs) -> Result<i32> {
    let mut collaborators: Vec<Box<dyn Collaborator>> = Vec::new();
    if args.timing {
        collaborators.push(Box::new(TimingReporter::new(&args.command)));
    }

    let tree_mode = args.audit_dir.is_some() || args.depsfile.is_some() || args.prereqs;
    if tree_mode {
        run_tree_audit(&args, &mut collaborators)
    } else {
        run_watch_audit(&args, &mut collaborators)
    }
}

/// Audit a known list of paths/patterns and report state changes.
///
/// With no watch list at all this degrades to a pass-through wrapper, which
/// is still useful with `--timing`.
fn run_watch_audit(
    args: &CliArgs,
    collaborators: &mut Vec<Box<dyn Collaborator>>,
) -> Result<i32> {
    let watch_list = args
        .watch
        .clone()
        .or_else(|| env::var("FSAUDIT_PATHS").ok());

    let session = match watch_list {
        Some(list) => {
            let patterns = parse_list(&list, args.separator);
            let compiled = WatchPatterns::compile(&patterns, ".")?;
            Some(AuditSession::begin(WatchSet::Patterns(compiled))?)
        }
        None => {
            debug!("no watch list; running as pass-through wrapper");
            None
        }
    };

    let paths = session.as_ref().map(AuditSession::paths).unwrap_or_default();
    hooks::run_before(collaborators, &paths);
    let status = exec::run_command(&args.command)?;
    hooks::run_after(collaborators, &paths, status.success());

    if let Some(session) = session {
        let events = session.finish()?;
        report::emit(&events, args.verbose, &args.command);
    }

    Ok(exec::exit_code(status))
}

/// Audit whole directory trees and infer prerequisites of the command.
fn run_tree_audit(
    args: &CliArgs,
    collaborators: &mut Vec<Box<dyn Collaborator>>,
) -> Result<i32> {
    let roots: Vec<PathBuf> = match &args.audit_dir {
        Some(list) => parse_list(list, args.separator)
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        None => vec![PathBuf::from(".")],
    };

    // Fail fast before the command runs: prerequisite data from a
    // filesystem that never updates atimes would be silently wrong.
    for root in &roots {
        deps::self_check(root)?;
    }

    let mut excludes = args.exclude.clone();
    let output = match &args.depsfile {
        Some(path) => {
            if let Some(name) = path.file_name() {
                excludes.push(name.to_string_lossy().into_owned());
            }
            Some((path.clone(), deps::open_output(path)?))
        }
        None => None,
    };

    let walk = TreeWalk::new(roots, &excludes)?;
    let session = AuditSession::begin(WatchSet::Trees(walk))?;

    let paths = session.paths();
    hooks::run_before(collaborators, &paths);
    let status = exec::run_command(&args.command)?;
    hooks::run_after(collaborators, &paths, status.success());

    let events = session.finish()?;
    let prereqs = deps::prerequisites(&events);

    match output {
        Some((path, file)) => deps::finalize_depsfile(&path, file, &prereqs)?,
        None => print!("{}", deps::render_plain(&prereqs)),
    }

    Ok(exec::exit_code(status))
}

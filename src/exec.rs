// src/exec.rs

//! Command execution boundary.
//!
//! The audited command runs as an opaque child strictly between priming and
//! re-read: standard streams are inherited untouched, the call blocks until
//! the child has fully exited, and the exit status is surfaced unchanged.
//! No timeout is imposed here; a hung child is the outer caller's problem.

use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};
use tracing::debug;

/// Spawn `argv` with inherited stdio and wait for it to exit.
pub fn run_command(argv: &[String]) -> Result<ExitStatus> {
    let (program, args) = argv.split_first().context("empty command line")?;

    debug!(?argv, "spawning audited command");
    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("spawning '{program}'"))?;
    debug!(code = status.code(), "audited command exited");

    Ok(status)
}

/// Map an exit status to the code we propagate: the child's own code, or the
/// conventional `128 + signal` when it died on a signal.
pub fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => 128 + status.signal().unwrap_or(0),
    }
}

// src/report.rs

//! Change report formatting.
//!
//! One line per non-UNCHANGED path, written to stderr so the audited
//! command's stdout stays clean for its own use.

use std::env;

use crate::classify::ChangeEvent;

/// Marker making report lines easy to grep out of interleaved build output.
pub const MARK: &str = "==-==";

/// Emit one report line per event, in the order given (path order).
pub fn emit(events: &[ChangeEvent], verbose: bool, argv: &[String]) {
    for event in events {
        eprintln!("{}", render_line(event, verbose, argv));
    }
}

/// Render a single report line, e.g. `fsaudit: ==-== CREATED: foo`.
///
/// Verbose mode appends the working directory and the audited command line.
pub fn render_line(event: &ChangeEvent, verbose: bool, argv: &[String]) -> String {
    let mut line = format!(
        "fsaudit: {MARK} {}: {}",
        event.change,
        event.path.display()
    );
    if verbose {
        let cwd = env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "?".to_string());
        line.push_str(&format!(" [{cwd}] ({})", shell_join(argv)));
    }
    line
}

/// Join argv for display, quoting arguments with whitespace. Visual only; no
/// commitment that the result can be fed back to a shell.
pub fn shell_join(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| {
            if arg.contains([' ', '\t']) {
                format!("'{arg}'")
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

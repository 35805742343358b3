// src/hooks.rs

//! External collaborator seam.
//!
//! Side-effecting helpers (cache flushers, timing reporters, debug shells)
//! run around the snapshot phases but are not part of the classification
//! engine. They see only the list of watched paths and, afterwards, whether
//! the command succeeded; their failures are logged and never affect the
//! audit or the command's exit status.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use tracing::warn;

use crate::report::shell_join;

/// A collaborator invoked before and after the audited command.
pub trait Collaborator {
    /// Called after the baseline snapshot is in place, before the command
    /// starts.
    fn before_command(&mut self, paths: &[PathBuf]) -> Result<()>;

    /// Called once the command has fully exited, before classification.
    fn after_command(&mut self, paths: &[PathBuf], command_succeeded: bool) -> Result<()>;
}

/// Run all `before_command` hooks, logging failures.
pub fn run_before(collaborators: &mut [Box<dyn Collaborator>], paths: &[PathBuf]) {
    for hook in collaborators.iter_mut() {
        if let Err(err) = hook.before_command(paths) {
            warn!(error = %err, "collaborator failed before command");
        }
    }
}

/// Run all `after_command` hooks, logging failures.
pub fn run_after(collaborators: &mut [Box<dyn Collaborator>], paths: &[PathBuf], success: bool) {
    for hook in collaborators.iter_mut() {
        if let Err(err) = hook.after_command(paths, success) {
            warn!(error = %err, "collaborator failed after command");
        }
    }
}

/// Prints the command line and its elapsed wall time once it finishes.
#[derive(Debug)]
pub struct TimingReporter {
    command: String,
    started: Option<Instant>,
}

impl TimingReporter {
    pub fn new(argv: &[String]) -> Self {
        Self {
            command: shell_join(argv),
            started: None,
        }
    }
}

impl Collaborator for TimingReporter {
    fn before_command(&mut self, _paths: &[PathBuf]) -> Result<()> {
        self.started = Some(Instant::now());
        Ok(())
    }

    fn after_command(&mut self, _paths: &[PathBuf], _command_succeeded: bool) -> Result<()> {
        if let Some(started) = self.started.take() {
            eprintln!("- {} ({:.1}s)", self.command, started.elapsed().as_secs_f64());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl Collaborator for Recorder {
        fn before_command(&mut self, _paths: &[PathBuf]) -> Result<()> {
            self.0.borrow_mut().push("before".to_string());
            Ok(())
        }

        fn after_command(&mut self, _paths: &[PathBuf], success: bool) -> Result<()> {
            self.0.borrow_mut().push(format!("after:{success}"));
            Ok(())
        }
    }

    #[test]
    fn hooks_see_both_phases_and_the_outcome() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hooks: Vec<Box<dyn Collaborator>> = vec![Box::new(Recorder(log.clone()))];
        run_before(&mut hooks, &[]);
        run_after(&mut hooks, &[], false);
        assert_eq!(
            *log.borrow(),
            vec!["before".to_string(), "after:false".to_string()]
        );
    }

    #[test]
    fn timing_after_without_before_is_a_no_op() {
        let mut timing = TimingReporter::new(&["true".to_string()]);
        timing.after_command(&[], true).unwrap();
        assert!(timing.started.is_none());
    }

    #[test]
    fn failing_hook_does_not_poison_the_run() {
        struct Failing;
        impl Collaborator for Failing {
            fn before_command(&mut self, _paths: &[PathBuf]) -> Result<()> {
                anyhow::bail!("flush host unreachable")
            }
            fn after_command(&mut self, _paths: &[PathBuf], _ok: bool) -> Result<()> {
                anyhow::bail!("flush host unreachable")
            }
        }
        let mut hooks: Vec<Box<dyn Collaborator>> = vec![Box::new(Failing)];
        run_before(&mut hooks, &[]);
        run_after(&mut hooks, &[], true);
    }
}

// tests/audit_scenarios.rs

//! End-to-end audit windows: resolve, prime, run a real child process,
//! classify. Scenarios that depend on the host filesystem recording atimes
//! check `deps::self_check` first and skip when it cannot pass.

use std::error::Error;
use std::fs;

use fsaudit::classify::Change;
use fsaudit::deps;
use fsaudit::exec;
use fsaudit::resolve::{WatchPatterns, WatchSet};
use fsaudit::snapshot::AuditSession;

type TestResult = Result<(), Box<dyn Error>>;

fn session_for(patterns: &[&str], base: &std::path::Path) -> Result<AuditSession, Box<dyn Error>> {
    let patterns: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
    let compiled = WatchPatterns::compile(&patterns, base)?;
    Ok(AuditSession::begin(WatchSet::Patterns(compiled))?)
}

fn run_shell(script: &str) -> TestResult {
    let status = exec::run_command(&["sh".into(), "-c".into(), script.into()])?;
    assert!(status.success(), "helper command failed: {script}");
    Ok(())
}

#[test]
fn absent_watched_path_created_by_command_is_created() -> TestResult {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("out.txt");

    let session = session_for(&["out.txt"], dir.path())?;
    run_shell(&format!("touch {}", target.display()))?;
    let events = session.finish()?;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].path, target);
    assert_eq!(events[0].change, Change::Created);
    Ok(())
}

#[test]
fn file_appearing_under_a_pending_glob_is_created() -> TestResult {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("build.log");

    let session = session_for(&["*.log"], dir.path())?;
    assert!(session.paths().is_empty(), "glob should match nothing yet");

    run_shell(&format!("echo done > {}", target.display()))?;
    let events = session.finish()?;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].path, target);
    assert_eq!(events[0].change, Change::Created);
    Ok(())
}

#[test]
fn rewritten_file_is_modified() -> TestResult {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("notes.txt");
    fs::write(&target, "v1\n")?;

    let session = session_for(&["notes.txt"], dir.path())?;
    run_shell(&format!("echo v2 >> {}", target.display()))?;
    let events = session.finish()?;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].change, Change::Modified);
    Ok(())
}

#[test]
fn read_only_file_is_accessed() -> TestResult {
    let dir = tempfile::tempdir()?;
    if deps::self_check(dir.path()).is_err() {
        eprintln!("skipping: filesystem does not record atimes");
        return Ok(());
    }

    let target = dir.path().join("input.txt");
    fs::write(&target, "payload\n")?;

    let session = session_for(&["input.txt"], dir.path())?;
    run_shell(&format!("cat {} > /dev/null", target.display()))?;
    let events = session.finish()?;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].change, Change::Accessed);
    Ok(())
}

#[test]
fn deleted_file_is_removed_and_stays_quiet_afterwards() -> TestResult {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("victim.txt");
    fs::write(&target, "doomed\n")?;

    let session = session_for(&["victim.txt"], dir.path())?;
    run_shell(&format!("rm {}", target.display()))?;
    let events = session.finish()?;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].change, Change::Removed);

    // A second window over the now-absent path reports nothing.
    let session = session_for(&["victim.txt"], dir.path())?;
    run_shell("true")?;
    let events = session.finish()?;
    assert!(events.is_empty());
    Ok(())
}

#[test]
fn untouched_files_never_appear_in_the_report() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("a.txt"), "a\n")?;
    fs::write(dir.path().join("b.txt"), "b\n")?;

    let session = session_for(&["*.txt"], dir.path())?;
    run_shell("true")?;
    let events = session.finish()?;

    assert!(events.is_empty(), "unexpected events: {events:?}");
    Ok(())
}

#[test]
fn command_exit_code_is_independent_of_the_audit() -> TestResult {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("partial.txt");

    let session = session_for(&["partial.txt"], dir.path())?;
    let status = exec::run_command(&[
        "sh".into(),
        "-c".into(),
        format!("touch {} && exit 3", target.display()),
    ])?;
    assert_eq!(exec::exit_code(status), 3);

    // The failed command's effects are still classified.
    let events = session.finish()?;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].change, Change::Created);
    Ok(())
}

// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `fsaudit`.
///
/// The audited command itself follows a `--` separator and is passed through
/// unparsed, e.g. `fsaudit -w 'foo:bar' -- make all`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fsaudit",
    version,
    about = "Run a command and report which watched files it created, modified, read or removed.",
    long_about = None
)]
pub struct CliArgs {
    /// Delimiter-separated glob patterns naming paths to watch.
    ///
    /// Falls back to the FSAUDIT_PATHS environment variable, so the wrapper
    /// can be injected where flags can't be passed (e.g. `make SHELL=`).
    #[arg(
        short = 'w',
        long,
        value_name = "LIST",
        conflicts_with_all = ["audit_dir", "depsfile", "prereqs"]
    )]
    pub watch: Option<String>,

    /// Delimiter-separated root directories to audit as whole trees.
    #[arg(short = 'a', long, value_name = "LIST")]
    pub audit_dir: Option<String>,

    /// Write a makefile-style prerequisite rule for the command to FILE.
    ///
    /// Implies tree auditing of --audit-dir (default ".").
    #[arg(short = 'd', long, value_name = "FILE")]
    pub depsfile: Option<PathBuf>,

    /// Print inferred prerequisites to stdout, one per line.
    #[arg(short = 'p', long)]
    pub prereqs: bool,

    /// Delimiter character for --watch / --audit-dir lists.
    #[arg(short = 's', long, value_name = "CHAR", default_value_t = ':')]
    pub separator: char,

    /// Extra glob patterns to exclude from tree audits (repeatable).
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Print the command line and its elapsed wall time when it finishes.
    #[arg(long)]
    pub timing: bool,

    /// Include working directory and command line in change reports.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FSAUDIT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// The command to run under audit.
    #[arg(last = true, required = true, value_name = "CMD")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

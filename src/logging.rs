// src/logging.rs

//! Diagnostics setup: `tracing` to stderr, so the audited command's stdout
//! and the change reports stay untouched.
//!
//! Level resolution: `--log-level` flag, else `FSAUDIT_LOG`, else `warn`.
//! The quiet default matters for a wrapper; a build's output should not be
//! interleaved with audit chatter unless asked for.

use std::io;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_max_level(resolve_level(cli_level))
        .with_target(true)
        .with_writer(io::stderr)
        .compact()
        .init();
    Ok(())
}

fn resolve_level(cli_level: Option<LogLevel>) -> Level {
    if let Some(lvl) = cli_level {
        return match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        };
    }

    match std::env::var("FSAUDIT_LOG").as_deref().map(str::trim) {
        Ok(s) if s.eq_ignore_ascii_case("error") => Level::ERROR,
        Ok(s) if s.eq_ignore_ascii_case("warn") || s.eq_ignore_ascii_case("warning") => {
            Level::WARN
        }
        Ok(s) if s.eq_ignore_ascii_case("info") => Level::INFO,
        Ok(s) if s.eq_ignore_ascii_case("debug") => Level::DEBUG,
        Ok(s) if s.eq_ignore_ascii_case("trace") => Level::TRACE,
        _ => Level::WARN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_takes_priority() {
        assert_eq!(resolve_level(Some(LogLevel::Debug)), Level::DEBUG);
    }
}

// src/errors.rs

//! Crate-wide error types.
//!
//! `AuditError` covers the classifiable fatal setup conditions; everything
//! else flows through `anyhow` with context attached at the call site.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("invalid watch pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("audit root {0:?} is not a directory")]
    BadAuditRoot(PathBuf),

    #[error("cannot open output file {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("filesystem at {0:?} does not update atimes on read; refusing to infer prerequisites")]
    AtimesUnsupported(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

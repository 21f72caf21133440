//! Error types for the classification run.
//!
//! Fatal errors (`Config`, `RegionLoad`, `DuplicateRegion`, `SourceWalk`)
//! abort before any file is touched. Per-record failures are represented by
//! the collaborator error types in [`crate::metadata`] and by plain
//! `io::Error` during dispatch; those are recovered in-loop and surfaced in
//! the final summary instead.

use std::path::PathBuf;
use thiserror::Error;

/// Run-level result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal, pre-run errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing configuration (flags, paths)
    #[error("configuration error: {0}")]
    Config(String),

    /// Region file is malformed or a feature lacks the name property
    #[error("failed to load region file: {0}")]
    RegionLoad(String),

    /// Two features share a name under the configured property key
    #[error("duplicate region name: {0:?}")]
    DuplicateRegion(String),

    /// Source directory cannot be enumerated
    #[error("cannot walk source directory {path:?}: {source}")]
    SourceWalk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error outside dispatch (region file open, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn region_load(msg: impl Into<String>) -> Self {
        Self::RegionLoad(msg.into())
    }
}

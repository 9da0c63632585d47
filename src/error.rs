//! Typed error kinds for the core engine.
//!
//! Call sites mostly return `anyhow::Result<T>` the way the rest of this
//! crate does; these variants exist for the handful of places a caller
//! needs to distinguish *why* an operation failed rather than just
//! display it (e.g. the CLI mapping a lookup miss onto `ExitCode::NotFound`
//! instead of `ExitCode::Error`).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XrayError {
    /// The indexed root is missing, not a directory, or unreadable.
    #[error("invalid root path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// A single file failed to parse or query; captured per-file, never fatal.
    #[error("failed to parse {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// A query's seed name resolved to no symbol.
    #[error("symbol '{0}' not found in codebase")]
    UnknownSymbol(String),

    /// A store operation (schema, I/O, transaction) failed.
    #[error("store error: {0}")]
    StoreError(String),
}

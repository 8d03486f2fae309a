//! Error taxonomy for the sync engine and its boundary capabilities.
//!
//! Three severities drive control flow: configuration errors are fatal and
//! abort before any remote mutation, filesystem and remote errors are
//! isolated to the entry that produced them, and cancellation aborts the
//! traversal outward cleanly.

use std::path::PathBuf;
use thiserror::Error;

/// Local filesystem capability failures
#[derive(Debug, Error)]
pub enum FsError {
    #[error("failed to list directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Remote page-tree service failures
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service rejected the call (invalid parent, rate limit, auth)
    #[error("service rejected request (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered but the body was not in the expected shape
    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

/// Top-level error for a sync run
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing credential, invalid root path, or invalid limits. Fatal:
    /// reported before any remote mutation.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    FileSystem(#[from] FsError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// External cancellation observed between entries
    #[error("sync cancelled")]
    Cancelled,
}

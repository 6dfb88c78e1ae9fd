//! Error types for progress persistence and snapshot export.

use std::path::PathBuf;
use thiserror::Error;

/// Errors around the durable progress record. None of these are fatal: a
/// failed load degrades to an empty store, a failed write leaves the
/// in-memory state authoritative.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read progress record {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed progress record")]
    Parse(#[from] serde_json::Error),

    #[error("failed to write progress record {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove progress record {path}")]
    Clear {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create data directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not locate a home directory")]
    NoHome,
}

/// Errors from the share/export collaborator. Always swallowed at the call
/// site (logged, busy flag reset), never surfaced to the progress store.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("could not locate a home directory")]
    NoHome,

    #[error("failed to encode snapshot")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write snapshot {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! Store error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations
///
/// Every store operation returns a typed failure instead of logging and
/// swallowing it, so presentation layers can tell "no results" apart from
/// "store unreachable" and decide how to degrade.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid stored document: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Unknown agent type: {0}")]
    UnknownAgent(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types for catalog analysis and snapshot handling

use std::path::PathBuf;

/// Result type alias for analyzer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, loading, or saving an index catalog
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cannot reach or authenticate to the deployment
    #[error("connection failed: {0}")]
    Connection(String),

    /// Listing databases, collections, indexes, or usage failed for one unit of work
    #[error("failed to enumerate {scope}: {reason}")]
    Enumeration {
        /// What was being listed (database name or namespace)
        scope: String,
        /// Driver-level reason
        reason: String,
    },

    /// Raw index definition without any key fields
    #[error("malformed index {name:?} on {namespace}: no key fields")]
    MalformedIndex {
        /// Owning namespace (`db.collection`)
        namespace: String,
        /// Index name as reported by the server
        name: String,
    },

    /// Snapshot file is malformed, truncated, or fails its content hash
    #[error("snapshot codec error: {0}")]
    SnapshotCodec(String),

    /// File does not carry the snapshot suffix
    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn enumeration(scope: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Enumeration {
            scope: scope.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if this error terminates the whole run
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

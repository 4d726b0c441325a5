//! Error types for outline movements, file synchronisation and book storage.
//!
//! Each concern gets its own enum so callers can match on exactly the failures their step
//! can produce: the movement engine only ever returns [`OutlineError`], the synchroniser
//! [`SyncError`], and the book store wraps both in [`BookError`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the pure movement engine and of structure validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineError {
    /// The referenced id is absent from the supplied section list.
    #[error("section {0} not found")]
    SectionNotFound(String),

    /// The requested move would break a structural invariant.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// An ingested outline does not satisfy the structural invariants.
    #[error("invalid outline structure: {0}")]
    InvalidStructure(String),
}

/// Failures while applying section updates to files on disk.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An update refers to a section missing from the snapshot.
    #[error("section {0} not found")]
    SectionNotFound(String),

    /// A file named by an update is missing on disk.
    #[error("file does not exist: {}. It may have been moved or deleted outside the application", .0.display())]
    FileNotFound(PathBuf),

    /// A file contains no heading line that could be renumbered.
    #[error("no heading found in {}", .0.display())]
    NoHeadingFound(PathBuf),

    /// A rename target is occupied by a file outside the batch.
    #[error("cannot rename onto {}: the path is already taken", .0.display())]
    PathConflict(PathBuf),

    /// A filesystem operation failed.
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        /// What was being attempted, e.g. "rename" or "write".
        action: &'static str,
        /// File the operation was applied to.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Failures of the book parser, storage layer and store.
#[derive(Debug, Error)]
pub enum BookError {
    /// A movement was rejected or an outline is malformed.
    #[error(transparent)]
    Outline(#[from] OutlineError),

    /// Synchronising files for a movement failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The structure file could not be (de)serialised.
    #[error("invalid book structure JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a path failed.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// No container with this id exists in the book.
    #[error("container {0} not found")]
    ContainerNotFound(String),

    /// The book root holds no structure file.
    #[error("no book structure found at {}", .0.display())]
    NotFound(PathBuf),

    /// Refused to overwrite an existing structure file.
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// The markdown grammar could not be loaded or queried.
    #[error("markdown grammar error: {0}")]
    Grammar(String),
}

impl BookError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl SyncError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

//! Errors raised while maintaining the liveness record.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the liveness tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The record was expected but absent.
    #[error("pid file does not exist: {path:?}")]
    Missing {
        /// Record path.
        path: PathBuf,
    },
    /// Creating or overwriting the record failed.
    #[error("failed to write pid file {path:?}: {source}")]
    Write {
        /// Record path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Removing the record failed.
    #[error("failed to remove pid file {path:?}: {source}")]
    Remove {
        /// Record path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The watcher process could not be started.
    #[error("failed to spawn watcher for {path:?}: {source}")]
    Spawn {
        /// Record path the watcher follows.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

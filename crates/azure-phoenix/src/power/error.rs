use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures at the power controller boundary.
#[derive(Debug, Error)]
pub enum PowerError {
    /// The fence agent program is missing or not executable.
    #[error("fence agent {program:?} is not available: {source}")]
    MissingDependency {
        /// Program that could not be started.
        program: PathBuf,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },
    /// The fence agent ran and reported a failure.
    #[error("fence agent action '{action}' failed (status {status:?}): {message}")]
    Api {
        /// Fence agent action that failed.
        action: &'static str,
        /// Exit status, absent when killed by a signal.
        status: Option<i32>,
        /// Trimmed diagnostic output.
        message: String,
    },
    /// Talking to the fence agent failed.
    #[error("fence agent {program:?} I/O failed: {source}")]
    Io {
        /// Program being driven.
        program: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl PowerError {
    /// Whether the failure is a missing or unusable fence agent rather than
    /// an Azure-side error.
    #[must_use]
    pub const fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }
}

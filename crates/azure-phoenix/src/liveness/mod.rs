//! Tracks whether this resource instance is started.
//!
//! "Started" is represented by a long-lived watcher process whose pid lives
//! in a per-instance record file. The record is what the cluster manager
//! sees between invocations:
//! - [`pid_file`] is the default backend; it proves liveness by matching the
//!   recorded pid's command line against the watcher signature.
//! - [`supervised`] keeps the watcher's [`std::process::Child`] for hosts
//!   that embed the dispatcher and outlive a single action.
//! - [`probe`] wraps the process table lookups used by the file backend.
//! - [`watcher`] builds the watcher command and its signature.

mod error;
mod pid_file;
mod probe;
mod supervised;
mod watcher;

use std::fmt;

pub use error::TrackerError;
pub use pid_file::PidFileTracker;
pub use supervised::SupervisedTracker;
pub use watcher::watcher_signature;

pub(crate) const LIVENESS_TARGET: &str = "azure_phoenix::liveness";

/// Whether the resource instance is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The watcher named by the record is alive.
    Running,
    /// No record, a stale record, or a dead watcher.
    NotRunning,
}

impl fmt::Display for Liveness {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => formatter.write_str("running"),
            Self::NotRunning => formatter.write_str("not running"),
        }
    }
}

/// Storage and proof of the "started" state.
pub trait LivenessTracker {
    /// Reports whether the instance is started.
    ///
    /// Unreadable or stale records report [`Liveness::NotRunning`].
    fn query(&mut self) -> Liveness;

    /// Clears any stale record and writes an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] when the record cannot be replaced.
    fn create(&mut self) -> Result<(), TrackerError>;

    /// Starts a watcher process and returns its pid.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Spawn`] when the watcher cannot be started.
    fn spawn_watcher(&mut self) -> Result<u32, TrackerError>;

    /// Writes the watcher pid into the record.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] when the record cannot be written.
    fn record(&mut self, pid: u32) -> Result<(), TrackerError>;

    /// Removes the record and terminates the watcher it named.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Missing`] when there is no record to remove.
    fn delete(&mut self) -> Result<(), TrackerError>;
}

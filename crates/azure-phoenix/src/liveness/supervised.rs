//! Liveness tracked through a held child handle.
//!
//! A host that embeds the dispatcher for longer than one action can keep the
//! watcher as a [`Child`] and ask the kernel directly whether it exited,
//! which removes command-line matching and pid reuse from the picture. The
//! record file is still written so external tooling sees the same layout.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Child;

use tracing::{info, warn};

use super::{LIVENESS_TARGET, Liveness, LivenessTracker, PidFileTracker, TrackerError, probe};
use super::watcher;

/// Tracker owning the watcher process it started.
#[derive(Debug)]
pub struct SupervisedTracker {
    record: PidFileTracker,
    child: Option<Child>,
}

impl SupervisedTracker {
    /// Creates a tracker for the record at `path` with no watcher yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            record: PidFileTracker::new(path),
            child: None,
        }
    }

    /// Record path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.record.path()
    }

    fn recorded_pid(&self) -> Option<u32> {
        fs::read_to_string(self.path())
            .ok()
            .and_then(|content| probe::parse_pid(&content))
    }

    fn reap(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Err(error) = child.kill()
            && error.kind() != io::ErrorKind::InvalidInput
        {
            warn!(
                target: LIVENESS_TARGET,
                pid = child.id(),
                error = %error,
                "failed to terminate watcher"
            );
        }
        if let Err(error) = child.wait() {
            warn!(
                target: LIVENESS_TARGET,
                pid = child.id(),
                error = %error,
                "failed to reap watcher"
            );
        }
    }
}

impl LivenessTracker for SupervisedTracker {
    fn query(&mut self) -> Liveness {
        let recorded = self.recorded_pid();
        let Some(child) = self.child.as_mut() else {
            return Liveness::NotRunning;
        };
        match child.try_wait() {
            Ok(None) if recorded == Some(child.id()) => Liveness::Running,
            Ok(None) => Liveness::NotRunning,
            Ok(Some(status)) => {
                info!(
                    target: LIVENESS_TARGET,
                    pid = child.id(),
                    %status,
                    "watcher exited"
                );
                Liveness::NotRunning
            }
            Err(error) => {
                warn!(
                    target: LIVENESS_TARGET,
                    pid = child.id(),
                    error = %error,
                    "failed to poll watcher"
                );
                Liveness::NotRunning
            }
        }
    }

    fn create(&mut self) -> Result<(), TrackerError> {
        self.reap();
        self.record.create()
    }

    fn spawn_watcher(&mut self) -> Result<u32, TrackerError> {
        self.reap();
        let child = watcher::spawn(self.record.path())?;
        let pid = child.id();
        self.child = Some(child);
        info!(target: LIVENESS_TARGET, pid, "supervised watcher started");
        Ok(pid)
    }

    fn record(&mut self, pid: u32) -> Result<(), TrackerError> {
        self.record.record(pid)
    }

    fn delete(&mut self) -> Result<(), TrackerError> {
        match fs::remove_file(self.path()) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(TrackerError::Missing {
                    path: self.path().to_path_buf(),
                });
            }
            Err(source) => {
                return Err(TrackerError::Remove {
                    path: self.path().to_path_buf(),
                    source,
                });
            }
        }
        self.reap();
        Ok(())
    }
}

//! Liveness record kept as a pid file, checked against the process table.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::watcher::{self, watcher_signature};
use super::{LIVENESS_TARGET, Liveness, LivenessTracker, TrackerError, probe};

/// File-backed tracker compatible with orchestrators that inspect the
/// record between invocations.
#[derive(Debug, Clone)]
pub struct PidFileTracker {
    path: PathBuf,
}

impl PidFileTracker {
    /// Creates a tracker for the record at `path`, which should be absolute
    /// so the watcher signature is stable across working directories.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Record path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_pid(&self) -> Option<u32> {
        let content = fs::read_to_string(&self.path).ok()?;
        probe::parse_pid(&content)
    }

    fn is_watcher(&self, pid: u32) -> bool {
        probe::is_alive(pid)
            && probe::command_line(pid).is_some_and(|command| command == self.signature())
    }

    fn signature(&self) -> String {
        watcher_signature(&self.path)
    }

    fn write(&self, contents: &str) -> Result<(), TrackerError> {
        let write_error = |source| TrackerError::Write {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&self.path)
            .map_err(write_error)?;
        file.write_all(contents.as_bytes()).map_err(write_error)?;
        file.sync_all().map_err(write_error)
    }
}

impl LivenessTracker for PidFileTracker {
    fn query(&mut self) -> Liveness {
        let Some(pid) = self.read_pid() else {
            debug!(
                target: LIVENESS_TARGET,
                file = %self.path.display(),
                "no readable pid in pid file"
            );
            return Liveness::NotRunning;
        };
        if !probe::is_alive(pid) {
            debug!(target: LIVENESS_TARGET, pid, "recorded watcher is not alive");
            return Liveness::NotRunning;
        }
        match probe::command_line(pid) {
            Some(command) if command == self.signature() => Liveness::Running,
            command => {
                debug!(
                    target: LIVENESS_TARGET,
                    pid,
                    command = command.as_deref().unwrap_or_default(),
                    "recorded pid is not the watcher"
                );
                Liveness::NotRunning
            }
        }
    }

    fn create(&mut self) -> Result<(), TrackerError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(
                    target: LIVENESS_TARGET,
                    file = %self.path.display(),
                    "removed stale pid file"
                );
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(TrackerError::Remove {
                    path: self.path.clone(),
                    source,
                });
            }
        }
        self.write("")
    }

    fn spawn_watcher(&mut self) -> Result<u32, TrackerError> {
        let child = watcher::spawn(&self.path)?;
        let pid = child.id();
        info!(target: LIVENESS_TARGET, pid, "watcher started");
        Ok(pid)
    }

    fn record(&mut self, pid: u32) -> Result<(), TrackerError> {
        self.write(&pid.to_string())?;
        info!(
            target: LIVENESS_TARGET,
            pid,
            file = %self.path.display(),
            "pid file written"
        );
        Ok(())
    }

    fn delete(&mut self) -> Result<(), TrackerError> {
        let pid = self.read_pid();
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(TrackerError::Missing {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(TrackerError::Remove {
                    path: self.path.clone(),
                    source,
                });
            }
        }
        if let Some(pid) = pid
            && self.is_watcher(pid)
            && let Err(errno) = probe::terminate(pid)
        {
            warn!(
                target: LIVENESS_TARGET,
                pid,
                error = %errno,
                "failed to terminate watcher"
            );
        }
        Ok(())
    }
}

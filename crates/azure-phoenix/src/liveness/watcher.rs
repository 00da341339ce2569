//! The placeholder process whose existence means "started".

use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use super::TrackerError;

const WATCHER_PROGRAM: &str = "tail";
const WATCHER_FLAG: &str = "-f";

/// Command line the watcher for `record` runs with, as the process table
/// reports it.
#[must_use]
pub fn watcher_signature(record: &Path) -> String {
    format!("{WATCHER_PROGRAM} {WATCHER_FLAG} {}", record.display())
}

/// Spawns the watcher detached from the agent: own process group and no
/// inherited stdio, so it outlives the invocation.
pub(super) fn spawn(record: &Path) -> Result<Child, TrackerError> {
    Command::new(WATCHER_PROGRAM)
        .arg(WATCHER_FLAG)
        .arg(record)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0)
        .spawn()
        .map_err(|source| TrackerError::Spawn {
            path: record.to_path_buf(),
            source,
        })
}

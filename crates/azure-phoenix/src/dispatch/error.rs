//! Error surface of the action dispatcher.

use std::io;

use phoenix_config::ConfigError;
use thiserror::Error;

use crate::liveness::TrackerError;
use crate::ocf::OcfStatus;
use crate::power::PowerError;

/// Reasons an action did not end in success.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Resource parameters failed validation.
    #[error("{0} Run with parameter help to get more information")]
    Misconfigured(#[source] ConfigError),
    /// The VM could not be verified with the given parameters.
    #[error("failed to verify VM: {0}")]
    Verification(#[source] PowerError),
    /// The resource is stopped. A normal monitor outcome.
    #[error("resource is not running")]
    NotRunning,
    /// The action is not implemented.
    #[error("action '{action}' is not implemented")]
    Unimplemented {
        /// Action as given.
        action: String,
    },
    /// The fence state could not be queried.
    #[error("failed to query fence state: {0}")]
    FenceQuery(#[source] PowerError),
    /// The VM was fenced and could not be powered on.
    #[error("failed to power on VM: {0}")]
    Reconciliation(#[source] PowerError),
    /// The liveness record could not be maintained.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    /// The watcher was still alive after its record was removed.
    #[error("resource is still running after stop")]
    StillRunning,
    /// Writing action output failed.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

impl ActionError {
    /// OCF status reported for this error.
    #[must_use]
    pub const fn status(&self) -> OcfStatus {
        match self {
            Self::Misconfigured(_) | Self::Verification(_) => OcfStatus::NotConfigured,
            Self::NotRunning => OcfStatus::NotRunning,
            Self::Unimplemented { .. } => OcfStatus::Unimplemented,
            Self::FenceQuery(_)
            | Self::Reconciliation(_)
            | Self::Tracker(_)
            | Self::StillRunning
            | Self::Output(_) => OcfStatus::GenericError,
        }
    }

    /// Whether the fence agent itself was missing.
    #[must_use]
    pub const fn is_missing_dependency(&self) -> bool {
        match self {
            Self::Verification(error) | Self::FenceQuery(error) | Self::Reconciliation(error) => {
                error.is_missing_dependency()
            }
            _ => false,
        }
    }
}

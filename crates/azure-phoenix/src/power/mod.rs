//! Queries and changes the power state of the target VM.
//!
//! [`PowerController`] is the boundary to Azure. The production backend,
//! [`FenceAgent`], drives the cluster's fence agent program so credentials
//! and cloud endpoints are handled by the same code the fencing device uses.

mod error;
mod fence_agent;

use std::fmt;

use phoenix_config::VmTarget;

pub use error::PowerError;
pub use fence_agent::FenceAgent;

pub(crate) const POWER_TARGET: &str = "azure_phoenix::power";

/// Power state of the target VM as seen by the fencing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceState {
    /// The VM is powered off.
    Fenced,
    /// The VM is in any other state.
    NotFenced,
}

impl fmt::Display for FenceState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fenced => formatter.write_str("fenced"),
            Self::NotFenced => formatter.write_str("not fenced"),
        }
    }
}

/// Reads and changes VM power state.
#[cfg_attr(test, mockall::automock)]
pub trait PowerController {
    /// Reports whether the VM is fenced. Never changes state.
    ///
    /// # Errors
    ///
    /// Returns [`PowerError`] when the state cannot be determined.
    fn fence_state(&self, target: &VmTarget) -> Result<FenceState, PowerError>;

    /// Powers the VM on. Succeeds when it is already on.
    ///
    /// # Errors
    ///
    /// Returns [`PowerError`] when the request fails.
    fn power_on(&self, target: &VmTarget) -> Result<(), PowerError>;

    /// Confirms the VM exists and is reachable with the configured
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns [`PowerError`] when the VM cannot be found or queried.
    fn verify_vm(&self, target: &VmTarget) -> Result<(), PowerError>;
}

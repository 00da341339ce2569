//! OCF result codes returned to the cluster manager.

use std::fmt;
use std::process::ExitCode;

/// Exit status of one agent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcfStatus {
    /// The action completed.
    Success,
    /// The action failed for a reason not covered by another code.
    GenericError,
    /// The action is not implemented by this agent.
    Unimplemented,
    /// The resource parameters are missing or invalid.
    NotConfigured,
    /// The resource is cleanly stopped.
    NotRunning,
}

impl OcfStatus {
    /// Numeric exit code defined by the OCF resource agent API.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::GenericError => 1,
            Self::Unimplemented => 3,
            Self::NotConfigured => 6,
            Self::NotRunning => 7,
        }
    }
}

impl fmt::Display for OcfStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "OCF_SUCCESS",
            Self::GenericError => "OCF_ERR_GENERIC",
            Self::Unimplemented => "OCF_ERR_UNIMPLEMENTED",
            Self::NotConfigured => "OCF_ERR_CONFIGURED",
            Self::NotRunning => "OCF_NOT_RUNNING",
        };
        formatter.write_str(label)
    }
}

impl From<OcfStatus> for ExitCode {
    fn from(status: OcfStatus) -> Self {
        Self::from(status.code())
    }
}

//! Maps an OCF action to its effect and result code.
//!
//! Each invocation runs exactly one action against one resource instance.
//! Everything except `meta-data` and `help` validates the configuration
//! before touching the liveness record or the VM.

mod action;
mod error;

use std::io::Write;

use phoenix_config::{ResourceConfig, VmTarget};
use tracing::{error, info};

use crate::descriptor::{metadata_xml, usage};
use crate::liveness::{Liveness, LivenessTracker};
use crate::ocf::OcfStatus;
use crate::power::{FenceState, PowerController};

pub use action::{Action, ActionRequest};
pub use error::ActionError;

const DISPATCH_TARGET: &str = "azure_phoenix::dispatch";

/// Runs OCF actions against a liveness tracker and a power controller.
#[derive(Debug)]
pub struct Dispatcher<T, P> {
    tracker: T,
    power: P,
}

impl<T, P> Dispatcher<T, P>
where
    T: LivenessTracker,
    P: PowerController,
{
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(tracker: T, power: P) -> Self {
        Self { tracker, power }
    }

    /// Releases the tracker and power controller.
    #[must_use]
    pub fn into_parts(self) -> (T, P) {
        (self.tracker, self.power)
    }

    /// Runs `request` and returns the status to exit with.
    ///
    /// Failures are logged here; the caller only sees the status.
    pub fn dispatch<W: Write>(
        &mut self,
        request: &ActionRequest,
        config: &ResourceConfig,
        stdout: &mut W,
    ) -> OcfStatus {
        match self.execute(request, config, stdout) {
            Ok(status) => status,
            Err(failure) => {
                report(request, &failure);
                failure.status()
            }
        }
    }

    fn execute<W: Write>(
        &mut self,
        request: &ActionRequest,
        config: &ResourceConfig,
        stdout: &mut W,
    ) -> Result<OcfStatus, ActionError> {
        let action = match request {
            ActionRequest::Known(Action::MetaData) => {
                write_output(stdout, &metadata_xml())?;
                return Ok(OcfStatus::Success);
            }
            ActionRequest::Known(Action::Help) => {
                write_output(stdout, &usage())?;
                return Ok(OcfStatus::Unimplemented);
            }
            ActionRequest::Known(action) => Some(*action),
            ActionRequest::Unknown(_) | ActionRequest::Missing => None,
        };

        let target = config.validate().map_err(ActionError::Misconfigured)?;
        match action {
            Some(Action::Monitor) => self.monitor(),
            Some(Action::Start) => self.start(&target),
            Some(Action::Stop) => self.stop(),
            Some(Action::ValidateAll) => self.validate_all(&target),
            Some(Action::MetaData | Action::Help) | None => Err(ActionError::Unimplemented {
                action: request.to_string(),
            }),
        }
    }

    fn monitor(&mut self) -> Result<OcfStatus, ActionError> {
        match self.tracker.query() {
            Liveness::Running => Ok(OcfStatus::Success),
            Liveness::NotRunning => Err(ActionError::NotRunning),
        }
    }

    fn start(&mut self, target: &VmTarget) -> Result<OcfStatus, ActionError> {
        if self.tracker.query() == Liveness::Running {
            info!(target: DISPATCH_TARGET, "resource is already running");
            return Ok(OcfStatus::Success);
        }

        self.tracker.create()?;
        let pid = self.tracker.spawn_watcher()?;
        self.tracker.record(pid)?;

        let state = self
            .power
            .fence_state(target)
            .map_err(ActionError::FenceQuery)?;
        info!(
            target: DISPATCH_TARGET,
            vm = %target.vm_name,
            %state,
            "queried fence state"
        );
        if state == FenceState::Fenced {
            self.power
                .power_on(target)
                .map_err(ActionError::Reconciliation)?;
            info!(target: DISPATCH_TARGET, vm = %target.vm_name, "VM powered on");
        }
        Ok(OcfStatus::Success)
    }

    fn stop(&mut self) -> Result<OcfStatus, ActionError> {
        if self.tracker.query() == Liveness::NotRunning {
            info!(target: DISPATCH_TARGET, "resource is already stopped");
            return Ok(OcfStatus::Success);
        }

        self.tracker.delete()?;
        match self.tracker.query() {
            Liveness::NotRunning => Ok(OcfStatus::Success),
            Liveness::Running => Err(ActionError::StillRunning),
        }
    }

    fn validate_all(&self, target: &VmTarget) -> Result<OcfStatus, ActionError> {
        self.power
            .verify_vm(target)
            .map_err(ActionError::Verification)?;
        Ok(OcfStatus::Success)
    }
}

fn write_output<W: Write>(stdout: &mut W, text: &str) -> Result<(), ActionError> {
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(ActionError::Output)
}

fn report(request: &ActionRequest, failure: &ActionError) {
    if matches!(failure, ActionError::NotRunning) {
        info!(target: DISPATCH_TARGET, action = %request, "{failure}");
    } else if failure.is_missing_dependency() {
        error!(
            target: DISPATCH_TARGET,
            action = %request,
            "fence agent is not installed or not executable: {failure}"
        );
    } else {
        error!(target: DISPATCH_TARGET, action = %request, "{failure}");
    }
}

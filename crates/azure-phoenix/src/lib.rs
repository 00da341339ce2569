//! Azure resource agent that unfences a virtual machine.
//!
//! Pacemaker invokes the agent once per action. [`run`] parses the action and
//! the `OCF_RESKEY_*` environment, resolves configuration once, and hands it
//! to a [`Dispatcher`] wired to the pid file [`PidFileTracker`] and the
//! [`FenceAgent`] power controller. The returned exit code is the OCF result.
//!
//! Hosts that embed the agent can build a [`Dispatcher`] themselves, for
//! example with the [`SupervisedTracker`] backend.

mod descriptor;
mod dispatch;
mod liveness;
mod metadata;
mod ocf;
mod power;
pub mod telemetry;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::error::ErrorKind;
use phoenix_config::{AgentArgs, MetadataSource, NoMetadata, ResourceConfig, RuntimeSettings};

pub use descriptor::{metadata_xml, usage};
pub use dispatch::{Action, ActionError, ActionRequest, Dispatcher};
pub use liveness::{
    Liveness, LivenessTracker, PidFileTracker, SupervisedTracker, TrackerError, watcher_signature,
};
pub use metadata::ImdsMetadata;
pub use ocf::OcfStatus;
pub use power::{FenceAgent, FenceState, PowerController, PowerError};

/// Runs one agent invocation with the given arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let argv: Vec<OsString> = args.into_iter().collect();
    match AgentArgs::try_parse_args(argv.iter().cloned()) {
        Ok(parsed) => run_with_metadata(&parsed, &ImdsMetadata::new(), stdout, stderr).into(),
        Err(error) => match informational_action(&argv) {
            Some(action) if !is_help_or_version(&error) => {
                let _ignored = write!(stderr, "{}", error.render());
                let fallback = AgentArgs {
                    action: Some(action),
                    ..AgentArgs::default()
                };
                run_with_metadata(&fallback, &NoMetadata, stdout, stderr).into()
            }
            _ => report_parse_error(&error, stdout, stderr).into(),
        },
    }
}

/// Runs one invocation from parsed arguments, consulting `metadata` for
/// missing resource group or subscription values.
#[must_use]
pub fn run_with_metadata<M, W, E>(
    args: &AgentArgs,
    metadata: &M,
    stdout: &mut W,
    stderr: &mut E,
) -> OcfStatus
where
    M: MetadataSource + ?Sized,
    W: Write,
    E: Write,
{
    let settings = match RuntimeSettings::from_args(args) {
        Ok(settings) => settings,
        Err(error) => {
            let _ignored = writeln!(stderr, "{error}");
            return OcfStatus::GenericError;
        }
    };
    if let Err(error) = telemetry::initialise(&settings) {
        let _ignored = writeln!(stderr, "{error}");
    }

    let request = ActionRequest::parse(args.action.as_deref());
    let config = if request.is_informational() {
        ResourceConfig::from_args(args)
    } else {
        ResourceConfig::resolve(args, metadata)
    };
    let mut dispatcher = Dispatcher::new(
        PidFileTracker::new(settings.record_path()),
        FenceAgent::new(settings.fence_agent()),
    );
    dispatcher.dispatch(&request, &config, stdout)
}

fn report_parse_error<W: Write, E: Write>(
    error: &clap::Error,
    stdout: &mut W,
    stderr: &mut E,
) -> OcfStatus {
    if is_help_or_version(error) {
        let _ignored = write!(stdout, "{}", error.render());
        OcfStatus::Success
    } else {
        let _ignored = write!(stderr, "{}", error.render());
        OcfStatus::NotConfigured
    }
}

fn is_help_or_version(error: &clap::Error) -> bool {
    matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

/// Finds `meta-data` or `help` among arguments clap rejected, so the agent
/// can still describe itself.
fn informational_action(argv: &[OsString]) -> Option<String> {
    argv.iter()
        .skip(1)
        .map(|arg| arg.to_string_lossy())
        .find(|arg| ActionRequest::parse(Some(arg.as_ref())).is_informational())
        .map(|arg| arg.trim().to_owned())
}

#[cfg(test)]
mod tests;

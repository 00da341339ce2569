//! Power controller backed by the `fence_azure_arm` fence agent.
//!
//! The agent reads `key=value` options on stdin, one per line, and reports
//! `status` through its exit code: `0` for powered on and `2` for powered
//! off.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use phoenix_config::{Credentials, VmTarget};
use tracing::debug;

use super::{FenceState, POWER_TARGET, PowerController, PowerError};

const STATUS_ACTION: &str = "status";
const ON_ACTION: &str = "on";
const STATUS_ON: i32 = 0;
const STATUS_OFF: i32 = 2;

/// Drives a fence agent program.
#[derive(Debug, Clone)]
pub struct FenceAgent {
    program: PathBuf,
}

impl FenceAgent {
    /// Creates a controller running `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, target: &VmTarget, action: &'static str) -> Result<Output, PowerError> {
        debug!(
            target: POWER_TARGET,
            program = %self.program.display(),
            action,
            vm = %target.vm_name,
            "invoking fence agent"
        );
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(source))?;
        // The pipe closes when `stdin` drops, before the child is awaited.
        let written = child.stdin.take().map_or(Ok(()), |mut stdin| {
            stdin.write_all(request(target, action).as_bytes())
        });
        let output = child
            .wait_with_output()
            .map_err(|source| self.io_error(source))?;
        match written {
            // An agent that exits without reading its options is judged by
            // its exit status alone.
            Err(source) if source.kind() != io::ErrorKind::BrokenPipe => {
                Err(self.io_error(source))
            }
            _ => Ok(output),
        }
    }

    fn spawn_error(&self, source: io::Error) -> PowerError {
        match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                PowerError::MissingDependency {
                    program: self.program.clone(),
                    source,
                }
            }
            _ => self.io_error(source),
        }
    }

    fn io_error(&self, source: io::Error) -> PowerError {
        PowerError::Io {
            program: self.program.clone(),
            source,
        }
    }
}

impl PowerController for FenceAgent {
    fn fence_state(&self, target: &VmTarget) -> Result<FenceState, PowerError> {
        let output = self.run(target, STATUS_ACTION)?;
        match output.status.code() {
            Some(STATUS_ON) => Ok(FenceState::NotFenced),
            Some(STATUS_OFF) => Ok(FenceState::Fenced),
            status => Err(api_error(STATUS_ACTION, status, &output)),
        }
    }

    fn power_on(&self, target: &VmTarget) -> Result<(), PowerError> {
        let output = self.run(target, ON_ACTION)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(api_error(ON_ACTION, output.status.code(), &output))
        }
    }

    fn verify_vm(&self, target: &VmTarget) -> Result<(), PowerError> {
        self.fence_state(target).map(|_| ())
    }
}

/// Renders the stdin option block for `action` against `target`.
fn request(target: &VmTarget, action: &str) -> String {
    let mut options = vec![
        ("action", action.to_owned()),
        ("plug", target.vm_name.clone()),
        ("resourceGroup", target.resource_group.clone()),
        ("subscriptionId", target.subscription_id.clone()),
    ];
    if !target.cloud.is_default() {
        options.push(("cloud", target.cloud.to_string()));
    }
    match &target.credentials {
        Credentials::ManagedIdentity => options.push(("msi", String::from("1"))),
        Credentials::ServicePrincipal {
            tenant_id,
            application_id,
            application_key,
        } => {
            options.push(("tenantId", tenant_id.clone()));
            options.push(("username", application_id.clone()));
            options.push(("password", application_key.clone()));
        }
    }
    if target.verbose {
        options.push(("verbose", String::from("1")));
    }
    options
        .iter()
        .map(|(key, value)| format!("{key}={value}\n"))
        .collect()
}

fn api_error(action: &'static str, status: Option<i32>, output: &Output) -> PowerError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_owned()
    } else {
        stderr.trim().to_owned()
    };
    PowerError::Api {
        action,
        status,
        message,
    }
}

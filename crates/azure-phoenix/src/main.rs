//! Entry point for the `azure-phoenix` resource agent.
//!
//! Delegates to [`azure_phoenix::run`] and exits with the OCF result code.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    azure_phoenix::run(std::env::args_os(), &mut stdout, &mut stderr)
}

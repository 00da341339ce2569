//! Process table lookups for the pid file backend.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

const PROC_ROOT: &str = "/proc";

/// Parses a recorded pid. Zero and values outside the kernel's pid range are
/// rejected so they can never address a process group.
pub(super) fn parse_pid(text: &str) -> Option<u32> {
    let pid = text.trim().parse::<u32>().ok()?;
    (pid != 0 && i32::try_from(pid).is_ok()).then_some(pid)
}

/// Whether a process with `pid` exists. A permission error still proves
/// existence.
pub(super) fn is_alive(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) | Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Space-joined argv of `pid`, from procfs where mounted and `ps` otherwise.
pub(super) fn command_line(pid: u32) -> Option<String> {
    let proc_root = Path::new(PROC_ROOT);
    match fs::read(proc_root.join(pid.to_string()).join("cmdline")) {
        Ok(raw) => Some(join_argv(&raw)),
        Err(_) if proc_root.join("self").exists() => None,
        Err(_) => ps_command_line(pid),
    }
}

/// Sends SIGTERM to `pid`.
pub(super) fn terminate(pid: u32) -> Result<(), Errno> {
    let raw = i32::try_from(pid).map_err(|_| Errno::ESRCH)?;
    kill(Pid::from_raw(raw), Signal::SIGTERM)
}

fn join_argv(raw: &[u8]) -> String {
    raw.split(|byte| *byte == 0)
        .filter(|arg| !arg.is_empty())
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

fn ps_command_line(pid: u32) -> Option<String> {
    let output = Command::new("ps")
        .args(["-o", "args=", "-p"])
        .arg(pid.to_string())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use std::process;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("4242\n", Some(4242))]
    #[case(" 17 ", Some(17))]
    #[case("0", None)]
    #[case("", None)]
    #[case("garbage", None)]
    #[case("-5", None)]
    #[case("4294967295", None)]
    fn parses_only_addressable_pids(#[case] text: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_pid(text), expected);
    }

    #[test]
    fn own_process_is_alive_with_a_command_line() {
        let pid = process::id();
        assert!(is_alive(pid));
        let command = command_line(pid).expect("own command line should be readable");
        assert!(!command.is_empty());
    }

    #[test]
    fn argv_is_space_joined() {
        assert_eq!(join_argv(b"tail\0-f\0/tmp/x.pid\0"), "tail -f /tmp/x.pid");
        assert_eq!(join_argv(b""), "");
    }
}

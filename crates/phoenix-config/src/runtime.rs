//! Derives where the agent keeps its liveness record and which helper
//! programs it runs.
//!
//! Every action of one resource instance must agree on the record path, so
//! the path is a pure function of the instance name and state directory.

use std::env;
use std::path::{self, Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::args::{AgentArgs, non_empty};
use crate::defaults::{DEFAULT_FENCE_AGENT, DEFAULT_INSTANCE, PID_FILE_PREFIX};
use crate::logging::LogFormat;

/// Process-level settings that are not resource parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    instance: String,
    state_dir: PathBuf,
    fence_agent: PathBuf,
    log_format: LogFormat,
    rejected_log_format: Option<String>,
    verbose: bool,
}

impl RuntimeSettings {
    /// Derives settings from parsed arguments.
    ///
    /// An unknown log format falls back to the default and is kept so it can
    /// be reported once logging is up.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the state directory is relative and the
    /// working directory cannot be determined.
    pub fn from_args(args: &AgentArgs) -> Result<Self, RuntimeError> {
        let instance = non_empty(args.resource_instance.as_ref())
            .unwrap_or_else(|| DEFAULT_INSTANCE.to_owned());
        let state_dir = args
            .state_dir
            .as_ref()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(
                || env::current_dir().map_err(|source| RuntimeError::WorkingDirectory { source }),
                |dir| absolute(dir),
            )?;
        let fence_agent = args
            .fence_agent
            .clone()
            .filter(|program| !program.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FENCE_AGENT));
        let requested = non_empty(args.log_format.as_ref());
        let log_format = requested
            .as_deref()
            .and_then(|text| LogFormat::from_str(text).ok())
            .unwrap_or_default();
        let rejected_log_format = requested.filter(|text| LogFormat::from_str(text).is_err());
        Ok(Self {
            instance,
            state_dir,
            fence_agent,
            log_format,
            rejected_log_format,
            verbose: args.is_verbose(),
        })
    }

    /// Fence agent program.
    #[must_use]
    pub fn fence_agent(&self) -> &Path {
        &self.fence_agent
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Log format value that was given but not recognised.
    #[must_use]
    pub fn rejected_log_format(&self) -> Option<&str> {
        self.rejected_log_format.as_deref()
    }

    /// Whether the `verbose` parameter is truthy.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Path of this instance's liveness record.
    ///
    /// Path separators in the instance name are replaced so the record always
    /// lands directly inside the state directory.
    #[must_use]
    pub fn record_path(&self) -> PathBuf {
        let instance: String = self
            .instance
            .chars()
            .map(|ch| if path::is_separator(ch) { '_' } else { ch })
            .collect();
        self.state_dir
            .join(format!("{PID_FILE_PREFIX}-{instance}.pid"))
    }
}

fn absolute(dir: &Path) -> Result<PathBuf, RuntimeError> {
    path::absolute(dir).map_err(|source| RuntimeError::StateDirectory {
        path: dir.to_path_buf(),
        source,
    })
}

/// Errors raised while deriving runtime settings.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The working directory could not be read.
    #[error("failed to determine working directory: {source}")]
    WorkingDirectory {
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The state directory could not be made absolute.
    #[error("failed to resolve state directory '{}': {source}", path.display())]
    StateDirectory {
        /// Directory as given.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let settings = RuntimeSettings::from_args(&AgentArgs::default())
            .expect("settings should derive");
        let record = settings.record_path();
        assert!(record.is_absolute());
        assert!(record.ends_with(format!("{PID_FILE_PREFIX}-{DEFAULT_INSTANCE}.pid")));
        assert_eq!(settings.fence_agent(), Path::new(DEFAULT_FENCE_AGENT));
        assert_eq!(settings.log_format(), LogFormat::Compact);
        assert_eq!(settings.rejected_log_format(), None);
        assert!(!settings.verbose());
    }

    #[rstest]
    #[case("json", LogFormat::Json, None)]
    #[case("COMPACT", LogFormat::Compact, None)]
    #[case("xml", LogFormat::Compact, Some("xml"))]
    fn log_format_falls_back_when_unknown(
        #[case] requested: &str,
        #[case] expected: LogFormat,
        #[case] rejected: Option<&str>,
    ) {
        let args = AgentArgs {
            log_format: Some(requested.to_owned()),
            verbose: Some("yes".to_owned()),
            ..AgentArgs::default()
        };
        let settings = RuntimeSettings::from_args(&args).expect("settings should derive");
        assert_eq!(settings.log_format(), expected);
        assert_eq!(settings.rejected_log_format(), rejected);
        assert!(settings.verbose());
    }

    #[test]
    fn record_path_is_keyed_by_instance() {
        let dir = TempDir::new().expect("create temp dir");
        let args = AgentArgs {
            resource_instance: Some("rsc_phoenix_node1".to_owned()),
            state_dir: Some(dir.path().to_path_buf()),
            ..AgentArgs::default()
        };
        let settings = RuntimeSettings::from_args(&args).expect("settings should derive");
        assert_eq!(
            settings.record_path(),
            dir.path().join("azure-phoenix-rsc_phoenix_node1.pid")
        );
    }

    #[rstest]
    #[case("clone/0", "azure-phoenix-clone_0.pid")]
    #[case("", "azure-phoenix-unknown.pid")]
    fn instance_names_are_sanitised(#[case] instance: &str, #[case] file_name: &str) {
        let args = AgentArgs {
            resource_instance: Some(instance.to_owned()),
            state_dir: Some(PathBuf::from("/run/resource-agents")),
            ..AgentArgs::default()
        };
        let settings = RuntimeSettings::from_args(&args).expect("settings should derive");
        assert_eq!(
            settings.record_path(),
            Path::new("/run/resource-agents").join(file_name)
        );
    }

    #[test]
    fn relative_state_dir_becomes_absolute() {
        let args = AgentArgs {
            state_dir: Some(PathBuf::from("state")),
            ..AgentArgs::default()
        };
        let settings = RuntimeSettings::from_args(&args).expect("settings should derive");
        let record = settings.record_path();
        assert!(record.is_absolute());
        assert!(record.parent().is_some_and(|dir| dir.ends_with("state")));
    }
}

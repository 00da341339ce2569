//! Command-line and environment surface of the agent.
//!
//! This is the only place the agent reads its environment. Pacemaker passes
//! the action as the single positional argument and everything else as
//! environment variables; the long flags exist for manual runs.
//!
//! Text values are read leniently: bytes that are not valid UTF-8 are
//! replaced rather than rejected, and the log format is kept as given so a
//! bad value cannot stop `meta-data` from answering.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use clap::builder::TypedValueParser;
use clap::{Arg, Command, Parser};

/// Raw invocation values before resolution and validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(
    name = "azure-phoenix",
    version,
    about = "Azure resource agent for fencing on",
    disable_help_subcommand = true
)]
pub struct AgentArgs {
    /// OCF action: start, stop, monitor, validate-all, meta-data or help.
    #[arg(value_name = "ACTION", value_parser = LossyText)]
    pub action: Option<String>,
    /// Name of the resource group.
    #[arg(long, env = "OCF_RESKEY_resourceGroup", value_name = "NAME", value_parser = LossyText)]
    pub resource_group: Option<String>,
    /// Name of the virtual machine to unfence.
    #[arg(long, env = "OCF_RESKEY_vmName", value_name = "NAME", value_parser = LossyText)]
    pub vm_name: Option<String>,
    /// Id of the Azure subscription.
    #[arg(long, env = "OCF_RESKEY_subscriptionId", value_name = "ID", value_parser = LossyText)]
    pub subscription_id: Option<String>,
    /// Non-public cloud: china, germany or usgov.
    #[arg(long, env = "OCF_RESKEY_cloud", value_name = "CLOUD", value_parser = LossyText)]
    pub cloud: Option<String>,
    /// Use Managed Service Identity instead of a Service Principal.
    #[arg(
        long = "use-msi",
        env = "OCF_RESKEY_useMSI",
        value_name = "BOOL",
        value_parser = LossyText
    )]
    pub use_msi: Option<String>,
    /// Id of the Azure Active Directory tenant.
    #[arg(long, env = "OCF_RESKEY_tenantId", value_name = "ID", value_parser = LossyText)]
    pub tenant_id: Option<String>,
    /// Application id of the Service Principal.
    #[arg(long, env = "OCF_RESKEY_applicationId", value_name = "ID", value_parser = LossyText)]
    pub application_id: Option<String>,
    /// Authentication key of the Service Principal.
    #[arg(
        long,
        env = "OCF_RESKEY_applicationKey",
        value_name = "KEY",
        hide_env_values = true,
        value_parser = LossyText
    )]
    pub application_key: Option<String>,
    /// Enables verbose output.
    #[arg(long, env = "OCF_RESKEY_verbose", value_name = "BOOL", value_parser = LossyText)]
    pub verbose: Option<String>,
    /// Resource instance name keying the liveness record.
    #[arg(long, env = "OCF_RESOURCE_INSTANCE", value_name = "NAME", value_parser = LossyText)]
    pub resource_instance: Option<String>,
    /// Directory holding liveness records.
    #[arg(long, env = "HA_RSCTMP", value_name = "DIR")]
    pub state_dir: Option<PathBuf>,
    /// Fence agent program used to query and change power state.
    #[arg(long, env = "AZURE_PHOENIX_FENCE_AGENT", value_name = "PROGRAM")]
    pub fence_agent: Option<PathBuf>,
    /// Log output format: compact or json.
    #[arg(
        long,
        env = "AZURE_PHOENIX_LOG_FORMAT",
        value_name = "FORMAT",
        value_parser = LossyText
    )]
    pub log_format: Option<String>,
}

impl AgentArgs {
    /// Parses arguments, reading unset values from the environment.
    ///
    /// # Errors
    ///
    /// Returns the clap error for unknown flags or surplus positionals;
    /// `--help` and `--version` also surface here.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Whether the `verbose` parameter is truthy.
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        crate::ocf_is_true(self.verbose.as_deref())
    }
}

/// Converts argument and environment bytes to text, replacing invalid UTF-8.
#[derive(Debug, Clone, Copy)]
struct LossyText;

impl TypedValueParser for LossyText {
    type Value = String;

    fn parse_ref(
        &self,
        _cmd: &Command,
        _arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        Ok(value.to_string_lossy().into_owned())
    }
}

/// Treats empty strings as absent, matching how OCF exports unset values.
pub(crate) fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    use super::{AgentArgs, non_empty};

    #[test]
    fn parses_action_and_flags() {
        let args = AgentArgs::try_parse_args([
            "azure-phoenix",
            "monitor",
            "--vm-name",
            "node-1",
            "--use-msi",
            "true",
            "--log-format",
            "json",
        ])
        .expect("arguments should parse");
        assert_eq!(args.action.as_deref(), Some("monitor"));
        assert_eq!(args.vm_name.as_deref(), Some("node-1"));
        assert_eq!(args.log_format.as_deref(), Some("json"));
    }

    #[test]
    fn help_is_an_action_not_a_subcommand() {
        let args =
            AgentArgs::try_parse_args(["azure-phoenix", "help"]).expect("help should parse");
        assert_eq!(args.action.as_deref(), Some("help"));
    }

    #[test]
    fn unknown_log_format_is_kept_for_later() {
        let args = AgentArgs::try_parse_args(["azure-phoenix", "meta-data", "--log-format", "xml"])
            .expect("any log format text should parse");
        assert_eq!(args.log_format.as_deref(), Some("xml"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let key = OsString::from_vec(vec![b's', 0xff, 0xfe]);
        let args = AgentArgs::try_parse_args([
            OsString::from("azure-phoenix"),
            OsString::from("meta-data"),
            OsString::from("--application-key"),
            key,
        ])
        .expect("non UTF-8 values should parse");
        assert_eq!(
            args.application_key.as_deref(),
            Some("s\u{fffd}\u{fffd}")
        );
    }

    #[test]
    fn rejects_surplus_positionals() {
        assert!(AgentArgs::try_parse_args(["azure-phoenix", "start", "stop"]).is_err());
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("   "), None)]
    #[case(Some(" rg "), Some("rg"))]
    fn empty_values_count_as_absent(#[case] input: Option<&str>, #[case] expected: Option<&str>) {
        let owned = input.map(str::to_owned);
        assert_eq!(non_empty(owned.as_ref()).as_deref(), expected);
    }
}

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable single line output, matching what the cluster
    /// manager captures from agent stderr.
    #[default]
    Compact,
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
}

/// Log filter applied when the agent runs with `verbose` enabled.
pub const VERBOSE_LOG_FILTER: &str = "debug";

/// Log filter applied otherwise.
pub const QUIET_LOG_FILTER: &str = "warn";

/// Returns the filter expression for the given verbosity.
#[must_use]
pub const fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_FILTER
    } else {
        QUIET_LOG_FILTER
    }
}

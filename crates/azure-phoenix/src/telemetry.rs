//! Structured logging for agent invocations.
//!
//! The cluster manager captures agent stderr into its own log, so every event
//! goes there. `verbose` widens the filter from warnings to debug output.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use phoenix_config::{LogFormat, RuntimeSettings, log_filter};
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{Subscriber, warn};
use tracing_subscriber::fmt::{self, time::UtcTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

const TELEMETRY_TARGET: &str = "azure_phoenix::telemetry";

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The filter expression did not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Installing the global subscriber failed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber described by `settings` on first call;
/// later calls are no-ops.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the subscriber cannot be installed.
pub fn initialise(settings: &RuntimeSettings) -> Result<(), TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install(settings))
        .map(|_| ())
}

fn install(settings: &RuntimeSettings) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(log_filter(settings.verbose()))
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer(settings.log_format()));
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;

    if let Some(requested) = settings.rejected_log_format() {
        warn!(
            target: TELEMETRY_TARGET,
            requested,
            "unknown log format, using {}",
            settings.log_format()
        );
    }
    Ok(())
}

fn stderr_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339())
        .with_target(true);
    match format {
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use phoenix_config::AgentArgs;

    use super::*;

    #[test]
    fn repeated_initialisation_is_idempotent() {
        let quiet = RuntimeSettings::from_args(&AgentArgs::default()).expect("quiet settings");
        let verbose_args = AgentArgs {
            verbose: Some(String::from("true")),
            log_format: Some(String::from("json")),
            ..AgentArgs::default()
        };
        let verbose = RuntimeSettings::from_args(&verbose_args).expect("verbose settings");
        initialise(&quiet).expect("first initialisation");
        initialise(&verbose).expect("second initialisation");
    }
}

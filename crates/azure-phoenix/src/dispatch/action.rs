use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumString};

/// OCF actions the agent understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
    /// Mark the resource started and unfence the VM if needed.
    Start,
    /// Mark the resource stopped.
    Stop,
    /// Report whether the resource is started.
    Monitor,
    /// Check the configuration against Azure.
    ValidateAll,
    /// Print the resource agent descriptor.
    MetaData,
    /// Print usage.
    Help,
}

/// The action named on the command line, which may be absent or unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    /// A supported action.
    Known(Action),
    /// An action this agent does not implement.
    Unknown(String),
    /// No action was given.
    Missing,
}

impl ActionRequest {
    /// Classifies a raw action argument.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|name| !name.is_empty()) {
            None => Self::Missing,
            Some(name) => Action::from_str(name)
                .map_or_else(|_| Self::Unknown(name.to_owned()), Self::Known),
        }
    }

    /// Whether the action runs without configuration.
    #[must_use]
    pub const fn is_informational(&self) -> bool {
        matches!(self, Self::Known(Action::MetaData | Action::Help))
    }
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(action) => action.fmt(formatter),
            Self::Unknown(name) => formatter.write_str(name),
            Self::Missing => formatter.write_str("<none>"),
        }
    }
}

//! Azure cloud variants accepted by the `cloud` parameter.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// Azure cloud the target VM lives in.
///
/// `Default` is the public cloud and is selected by leaving the parameter
/// unset; it cannot be named explicitly.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CloudVariant {
    /// Public Azure.
    #[default]
    #[strum(disabled)]
    Default,
    /// Azure China.
    China,
    /// Azure Germany.
    Germany,
    /// Azure US Government.
    UsGov,
}

impl CloudVariant {
    /// Values accepted for the `cloud` parameter, in the order they are
    /// reported to operators.
    pub const SUPPORTED: [&'static str; 3] = ["china", "germany", "usgov"];

    /// Supported values as operators read them: `china, germany and usgov`.
    #[must_use]
    pub fn supported_list() -> String {
        match Self::SUPPORTED.split_last() {
            Some((last, [])) => (*last).to_owned(),
            Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
            None => String::new(),
        }
    }

    /// Returns `true` for the public cloud.
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for CloudVariant {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => formatter.write_str("default"),
            Self::China => formatter.write_str("china"),
            Self::Germany => formatter.write_str("germany"),
            Self::UsGov => formatter.write_str("usgov"),
        }
    }
}

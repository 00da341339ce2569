//! The OCF parameter table shared by validation, usage text, and the
//! `meta-data` descriptor.
//!
//! Each entry names an `OCF_RESKEY_<name>` environment variable. The CLI
//! argument definitions in [`crate::AgentArgs`] mirror this table one to
//! one; a test in this module keeps the two in step.

use std::fmt;

/// Prefix Pacemaker applies to every resource parameter it exports.
pub const ENV_PREFIX: &str = "OCF_RESKEY_";

/// Environment variable carrying the resource instance name.
pub const RESOURCE_INSTANCE_ENV: &str = "OCF_RESOURCE_INSTANCE";

/// Parameter names as they appear in the descriptor and diagnostics.
pub mod names {
    /// Resource group of the target VM.
    pub const RESOURCE_GROUP: &str = "resourceGroup";
    /// Name of the target VM.
    pub const VM_NAME: &str = "vmName";
    /// Azure subscription id.
    pub const SUBSCRIPTION_ID: &str = "subscriptionId";
    /// Non-public cloud selector.
    pub const CLOUD: &str = "cloud";
    /// Managed identity switch.
    pub const USE_MSI: &str = "useMSI";
    /// Service principal tenant.
    pub const TENANT_ID: &str = "tenantId";
    /// Service principal application id.
    pub const APPLICATION_ID: &str = "applicationId";
    /// Service principal secret.
    pub const APPLICATION_KEY: &str = "applicationKey";
    /// Verbose logging switch.
    pub const VERBOSE: &str = "verbose";
}

/// Value type advertised for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Free-form text.
    String,
    /// OCF boolean (`yes`, `true`, `1`, `on`).
    Boolean,
}

impl fmt::Display for ContentType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => formatter.write_str("string"),
            Self::Boolean => formatter.write_str("boolean"),
        }
    }
}

/// Static description of one resource parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Parameter name without the environment prefix.
    pub name: &'static str,
    /// Whether the cluster manager must always supply a value.
    pub required: bool,
    /// Advertised value type.
    pub content: ContentType,
    /// One-line description.
    pub shortdesc: &'static str,
    /// Full description.
    pub longdesc: &'static str,
}

impl ParameterSpec {
    /// Environment variable Pacemaker uses to pass this parameter.
    #[must_use]
    pub fn env_key(&self) -> String {
        format!("{ENV_PREFIX}{}", self.name)
    }
}

/// Every parameter the agent accepts, in descriptor order.
pub const PARAMETERS: [ParameterSpec; 9] = [
    ParameterSpec {
        name: names::RESOURCE_GROUP,
        required: false,
        content: ContentType::String,
        shortdesc: "Name of the resource group",
        longdesc: "Name of the resource group. Metadata service is used if the value is not provided.",
    },
    ParameterSpec {
        name: names::VM_NAME,
        required: true,
        content: ContentType::String,
        shortdesc: "Name of the virtual machine",
        longdesc: "Name of the virtual machine that this resource agent instance should unfence",
    },
    ParameterSpec {
        name: names::SUBSCRIPTION_ID,
        required: false,
        content: ContentType::String,
        shortdesc: "Id of the Azure subscription",
        longdesc: "Id of the Azure subscription. Metadata service is used if the value is not provided.",
    },
    ParameterSpec {
        name: names::CLOUD,
        required: false,
        content: ContentType::String,
        shortdesc: "Name of the cloud you want to use.",
        longdesc: "Name of the cloud you want to use. Supported values are china, germany or usgov. Do not use this parameter if you want to use public Azure.",
    },
    ParameterSpec {
        name: names::USE_MSI,
        required: false,
        content: ContentType::Boolean,
        shortdesc: "Determines if Managed Service Identity should be used.",
        longdesc: "Determines if Managed Service Identity should be used instead of username and password (Service Principal). If this parameter is specified, parameters tenantId, applicationId and applicationKey are ignored.",
    },
    ParameterSpec {
        name: names::TENANT_ID,
        required: false,
        content: ContentType::String,
        shortdesc: "Id of the Azure Active Directory tenant",
        longdesc: "Id of the Azure Active Directory tenant. Only required if a Service Principal should be used",
    },
    ParameterSpec {
        name: names::APPLICATION_ID,
        required: false,
        content: ContentType::String,
        shortdesc: "Application Id",
        longdesc: "Application ID of the Service Principal. Only required if a Service Principal should be used",
    },
    ParameterSpec {
        name: names::APPLICATION_KEY,
        required: false,
        content: ContentType::String,
        shortdesc: "Authentication key",
        longdesc: "Authentication key of the Service Principal. Only required if a Service Principal should be used",
    },
    ParameterSpec {
        name: names::VERBOSE,
        required: false,
        content: ContentType::Boolean,
        shortdesc: "Enables verbose output",
        longdesc: "Enables verbose output",
    },
];

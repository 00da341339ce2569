//! Resolved resource configuration and its validation into a [`VmTarget`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, warn};

use crate::args::{AgentArgs, non_empty};
use crate::cloud::CloudVariant;
use crate::metadata::MetadataSource;
use crate::parameters::names;

const CONFIG_TARGET: &str = "phoenix_config::resource";

/// Returns whether an OCF boolean parameter is set to a truthy value.
#[must_use]
pub fn ocf_is_true(value: Option<&str>) -> bool {
    value.is_some_and(|text| {
        matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "yes" | "true" | "1" | "on" | "ja"
        )
    })
}

/// Configuration for one invocation, resolved once and never mutated.
///
/// Optional fields may still be missing; [`ResourceConfig::validate`]
/// decides whether the combination is usable.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResourceConfig {
    /// Resource group, possibly filled from instance metadata.
    pub resource_group: Option<String>,
    /// Target VM name.
    pub vm_name: Option<String>,
    /// Subscription id, possibly filled from instance metadata.
    pub subscription_id: Option<String>,
    /// Raw `cloud` value.
    pub cloud: Option<String>,
    /// Raw `useMSI` value.
    pub use_msi: Option<String>,
    /// Service principal tenant.
    pub tenant_id: Option<String>,
    /// Service principal application id.
    pub application_id: Option<String>,
    /// Service principal secret.
    pub application_key: Option<String>,
    /// Verbose logging.
    pub verbose: bool,
}

impl ResourceConfig {
    /// Builds the configuration from parsed arguments without consulting
    /// instance metadata.
    #[must_use]
    pub fn from_args(args: &AgentArgs) -> Self {
        Self {
            resource_group: non_empty(args.resource_group.as_ref()),
            vm_name: non_empty(args.vm_name.as_ref()),
            subscription_id: non_empty(args.subscription_id.as_ref()),
            cloud: non_empty(args.cloud.as_ref()),
            use_msi: non_empty(args.use_msi.as_ref()),
            tenant_id: non_empty(args.tenant_id.as_ref()),
            application_id: non_empty(args.application_id.as_ref()),
            application_key: non_empty(args.application_key.as_ref()),
            verbose: args.is_verbose(),
        }
    }

    /// Builds the configuration, filling a missing resource group or
    /// subscription id from instance metadata.
    ///
    /// Metadata is consulted at most once and only when needed. A failed
    /// lookup leaves the values absent so validation can name them.
    #[must_use]
    pub fn resolve<M: MetadataSource + ?Sized>(args: &AgentArgs, metadata: &M) -> Self {
        let mut config = Self::from_args(args);
        if config.resource_group.is_some() && config.subscription_id.is_some() {
            return config;
        }
        if config.resource_group.is_none() {
            info!(
                target: CONFIG_TARGET,
                "{} not provided. Using metadata service",
                names::RESOURCE_GROUP
            );
        }
        if config.subscription_id.is_none() {
            info!(
                target: CONFIG_TARGET,
                "{} not provided. Using metadata service",
                names::SUBSCRIPTION_ID
            );
        }
        match metadata.lookup() {
            Ok(instance) => {
                if config.resource_group.is_none() {
                    config.resource_group = non_empty(instance.resource_group.as_ref());
                }
                if config.subscription_id.is_none() {
                    config.subscription_id = non_empty(instance.subscription_id.as_ref());
                }
            }
            Err(error) => {
                warn!(
                    target: CONFIG_TARGET,
                    error = %error,
                    "metadata service lookup failed"
                );
            }
        }
        config
    }

    /// Whether managed identity authentication was requested.
    #[must_use]
    pub fn uses_managed_identity(&self) -> bool {
        ocf_is_true(self.use_msi.as_deref())
    }

    /// Checks the configuration and produces a fully populated target.
    ///
    /// Rules run in a fixed order and the first failure wins.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first missing or invalid
    /// parameter.
    pub fn validate(&self) -> Result<VmTarget, ConfigError> {
        let resource_group = required(self.resource_group.as_ref(), names::RESOURCE_GROUP)?;
        let vm_name = required(self.vm_name.as_ref(), names::VM_NAME)?;
        let subscription_id = required(self.subscription_id.as_ref(), names::SUBSCRIPTION_ID)?;

        let credentials = if self.uses_managed_identity() {
            Credentials::ManagedIdentity
        } else {
            Credentials::ServicePrincipal {
                tenant_id: principal(self.tenant_id.as_ref(), names::TENANT_ID)?,
                application_id: principal(self.application_id.as_ref(), names::APPLICATION_ID)?,
                application_key: principal(self.application_key.as_ref(), names::APPLICATION_KEY)?,
            }
        };

        let cloud = self
            .cloud
            .as_deref()
            .map_or(Ok(CloudVariant::Default), parse_cloud)?;

        Ok(VmTarget {
            resource_group,
            vm_name,
            subscription_id,
            cloud,
            credentials,
            verbose: self.verbose,
        })
    }
}

impl fmt::Debug for ResourceConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ResourceConfig")
            .field("resource_group", &self.resource_group)
            .field("vm_name", &self.vm_name)
            .field("subscription_id", &self.subscription_id)
            .field("cloud", &self.cloud)
            .field("use_msi", &self.use_msi)
            .field("tenant_id", &self.tenant_id)
            .field("application_id", &self.application_id)
            .field("application_key", &self.application_key.as_ref().map(|_| "***"))
            .field("verbose", &self.verbose)
            .finish()
    }
}

fn required(value: Option<&String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .cloned()
        .ok_or(ConfigError::MissingParameter { name })
}

fn parse_cloud(value: &str) -> Result<CloudVariant, ConfigError> {
    CloudVariant::from_str(value).map_err(|_| ConfigError::UnsupportedCloud {
        value: value.to_owned(),
    })
}

fn principal(value: Option<&String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .cloned()
        .ok_or(ConfigError::MissingServicePrincipal { name })
}

/// How the power controller authenticates against Azure.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// The VM's managed identity.
    ManagedIdentity,
    /// An application registered in Azure Active Directory.
    ServicePrincipal {
        /// Directory tenant.
        tenant_id: String,
        /// Application (client) id.
        application_id: String,
        /// Application secret.
        application_key: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManagedIdentity => formatter.write_str("ManagedIdentity"),
            Self::ServicePrincipal {
                tenant_id,
                application_id,
                ..
            } => formatter
                .debug_struct("ServicePrincipal")
                .field("tenant_id", tenant_id)
                .field("application_id", application_id)
                .field("application_key", &"***")
                .finish(),
        }
    }
}

/// A validated description of the VM this agent instance unfences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmTarget {
    /// Resource group containing the VM.
    pub resource_group: String,
    /// VM name.
    pub vm_name: String,
    /// Subscription containing the resource group.
    pub subscription_id: String,
    /// Azure cloud.
    pub cloud: CloudVariant,
    /// Authentication mode.
    pub credentials: Credentials,
    /// Verbose logging.
    pub verbose: bool,
}

/// Reasons a [`ResourceConfig`] cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required parameter was absent.
    #[error("Parameter {name} required.")]
    MissingParameter {
        /// Parameter name.
        name: &'static str,
    },
    /// A Service Principal credential was absent while managed identity is
    /// off.
    #[error("Parameter {name} required if Service Principal should be used.")]
    MissingServicePrincipal {
        /// Parameter name.
        name: &'static str,
    },
    /// The `cloud` parameter named an unknown cloud.
    #[error(
        "Value {value} for cloud parameter not supported. Supported values are {}",
        CloudVariant::supported_list()
    )]
    UnsupportedCloud {
        /// Offending value.
        value: String,
    },
}

impl ConfigError {
    /// Name of the parameter the error refers to.
    #[must_use]
    pub const fn parameter(&self) -> &'static str {
        match self {
            Self::MissingParameter { name } | Self::MissingServicePrincipal { name } => name,
            Self::UnsupportedCloud { .. } => names::CLOUD,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::metadata::{InstanceMetadata, MetadataError};

    #[fixture]
    fn principal_config() -> ResourceConfig {
        ResourceConfig {
            resource_group: Some("rg".to_owned()),
            vm_name: Some("node-1".to_owned()),
            subscription_id: Some("sub".to_owned()),
            tenant_id: Some("tenant".to_owned()),
            application_id: Some("app".to_owned()),
            application_key: Some("secret".to_owned()),
            ..ResourceConfig::default()
        }
    }

    struct CountingMetadata {
        calls: Cell<usize>,
        result: Result<InstanceMetadata, MetadataError>,
    }

    impl MetadataSource for CountingMetadata {
        fn lookup(&self) -> Result<InstanceMetadata, MetadataError> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    #[rstest]
    #[case("yes", true)]
    #[case("TRUE", true)]
    #[case("1", true)]
    #[case("on", true)]
    #[case("false", false)]
    #[case("0", false)]
    #[case("maybe", false)]
    fn ocf_booleans(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(ocf_is_true(Some(input)), expected);
    }

    #[rstest]
    fn service_principal_config_validates(principal_config: ResourceConfig) {
        let target = principal_config.validate().expect("config should validate");
        assert_eq!(target.vm_name, "node-1");
        assert_eq!(target.cloud, CloudVariant::Default);
        assert!(matches!(
            target.credentials,
            Credentials::ServicePrincipal { .. }
        ));
    }

    #[rstest]
    #[case::resource_group(names::RESOURCE_GROUP)]
    #[case::vm_name(names::VM_NAME)]
    #[case::subscription(names::SUBSCRIPTION_ID)]
    fn missing_identity_parameter_is_named(
        mut principal_config: ResourceConfig,
        #[case] name: &'static str,
    ) {
        match name {
            names::RESOURCE_GROUP => principal_config.resource_group = None,
            names::VM_NAME => principal_config.vm_name = None,
            _ => principal_config.subscription_id = None,
        }
        let error = principal_config
            .validate()
            .expect_err("validation should fail");
        assert_eq!(error, ConfigError::MissingParameter { name });
        assert!(error.to_string().contains(name));
    }

    #[rstest]
    fn first_failure_wins(principal_config: ResourceConfig) {
        let config = ResourceConfig {
            resource_group: None,
            vm_name: None,
            cloud: Some("france".to_owned()),
            ..principal_config
        };
        assert_eq!(
            config.validate().expect_err("validation should fail").parameter(),
            names::RESOURCE_GROUP
        );
    }

    #[rstest]
    #[case::tenant(names::TENANT_ID)]
    #[case::application(names::APPLICATION_ID)]
    #[case::key(names::APPLICATION_KEY)]
    fn service_principal_requires_each_credential(
        mut principal_config: ResourceConfig,
        #[case] name: &'static str,
    ) {
        match name {
            names::TENANT_ID => principal_config.tenant_id = None,
            names::APPLICATION_ID => principal_config.application_id = None,
            _ => principal_config.application_key = None,
        }
        let error = principal_config
            .validate()
            .expect_err("validation should fail");
        assert_eq!(error, ConfigError::MissingServicePrincipal { name });
    }

    #[rstest]
    fn managed_identity_ignores_missing_credentials(principal_config: ResourceConfig) {
        let config = ResourceConfig {
            use_msi: Some("true".to_owned()),
            tenant_id: None,
            application_id: None,
            application_key: None,
            ..principal_config
        };
        let target = config.validate().expect("managed identity should validate");
        assert_eq!(target.credentials, Credentials::ManagedIdentity);
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some("china"), true)]
    #[case(Some("germany"), true)]
    #[case(Some("usgov"), true)]
    #[case(Some("france"), false)]
    fn cloud_variants(
        principal_config: ResourceConfig,
        #[case] cloud: Option<&str>,
        #[case] valid: bool,
    ) {
        let config = ResourceConfig {
            cloud: cloud.map(str::to_owned),
            ..principal_config
        };
        assert_eq!(config.validate().is_ok(), valid);
    }

    #[test]
    fn unsupported_cloud_lists_valid_set() {
        let error = ConfigError::UnsupportedCloud {
            value: "france".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "Value france for cloud parameter not supported. Supported values are china, germany and usgov"
        );
    }

    #[test]
    fn metadata_fills_only_missing_values() {
        let args = AgentArgs {
            resource_group: Some("explicit-rg".to_owned()),
            ..AgentArgs::default()
        };
        let metadata = CountingMetadata {
            calls: Cell::new(0),
            result: Ok(InstanceMetadata {
                resource_group: Some("imds-rg".to_owned()),
                subscription_id: Some("imds-sub".to_owned()),
            }),
        };
        let config = ResourceConfig::resolve(&args, &metadata);
        assert_eq!(config.resource_group.as_deref(), Some("explicit-rg"));
        assert_eq!(config.subscription_id.as_deref(), Some("imds-sub"));
        assert_eq!(metadata.calls.get(), 1);
    }

    #[test]
    fn metadata_is_skipped_when_values_are_present() {
        let args = AgentArgs {
            resource_group: Some("rg".to_owned()),
            subscription_id: Some("sub".to_owned()),
            ..AgentArgs::default()
        };
        let metadata = CountingMetadata {
            calls: Cell::new(0),
            result: Err(MetadataError::Unavailable),
        };
        let _config = ResourceConfig::resolve(&args, &metadata);
        assert_eq!(metadata.calls.get(), 0);
    }

    #[test]
    fn failed_metadata_leaves_values_absent() {
        let metadata = CountingMetadata {
            calls: Cell::new(0),
            result: Err(MetadataError::Unavailable),
        };
        let config = ResourceConfig::resolve(&AgentArgs::default(), &metadata);
        assert_eq!(config.resource_group, None);
        assert_eq!(config.subscription_id, None);
    }

    #[rstest]
    fn debug_output_redacts_secret(principal_config: ResourceConfig) {
        let rendered = format!("{principal_config:?}");
        assert!(!rendered.contains("secret"), "{rendered}");
        let target = principal_config.validate().expect("config should validate");
        assert!(!format!("{target:?}").contains("secret"));
    }
}

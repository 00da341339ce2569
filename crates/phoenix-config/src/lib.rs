//! Configuration for the `azure-phoenix` resource agent.
//!
//! The cluster manager hands the agent its parameters as `OCF_RESKEY_*`
//! environment variables. This crate reads them exactly once through
//! [`AgentArgs`], fills gaps from instance metadata via
//! [`ResourceConfig::resolve`], and validates the result into a [`VmTarget`]
//! that the power controller consumes. Runtime paths such as the liveness
//! record live in [`RuntimeSettings`].

mod args;
mod cloud;
mod defaults;
mod logging;
mod metadata;
mod parameters;
mod resource;
mod runtime;

pub use args::AgentArgs;
pub use cloud::CloudVariant;
pub use defaults::{
    DEFAULT_FENCE_AGENT, DEFAULT_INSTANCE, METADATA_TIMEOUT_SECS, METADATA_URL, PID_FILE_PREFIX,
};
pub use logging::{LogFormat, QUIET_LOG_FILTER, VERBOSE_LOG_FILTER, log_filter};
pub use metadata::{InstanceMetadata, MetadataError, MetadataSource, NoMetadata};
pub use parameters::{
    ContentType, ENV_PREFIX, PARAMETERS, ParameterSpec, RESOURCE_INSTANCE_ENV, names,
};
pub use resource::{ConfigError, Credentials, ResourceConfig, VmTarget, ocf_is_true};
pub use runtime::{RuntimeError, RuntimeSettings};

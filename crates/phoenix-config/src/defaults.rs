/// Instance name used when `OCF_RESOURCE_INSTANCE` is unset.
pub const DEFAULT_INSTANCE: &str = "unknown";

/// Fence agent program queried for and used to change power state.
pub const DEFAULT_FENCE_AGENT: &str = "fence_azure_arm";

/// File name prefix of liveness records.
pub const PID_FILE_PREFIX: &str = "azure-phoenix";

/// Metadata service endpoint queried for resource group and subscription.
pub const METADATA_URL: &str = "http://169.254.169.254/metadata/instance?api-version=2017-08-01";

/// Seconds to wait for the metadata service before giving up.
pub const METADATA_TIMEOUT_SECS: u64 = 5;

//! Azure Instance Metadata Service client.
//!
//! Only `compute.resourceGroupName` and `compute.subscriptionId` are read;
//! the rest of the instance document is ignored.

use std::time::Duration;

use phoenix_config::{
    InstanceMetadata, METADATA_TIMEOUT_SECS, METADATA_URL, MetadataError, MetadataSource,
};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

const METADATA_TARGET: &str = "azure_phoenix::metadata";

#[derive(Debug, Deserialize)]
struct InstanceDocument {
    compute: ComputeSection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComputeSection {
    resource_group_name: Option<String>,
    subscription_id: Option<String>,
}

/// Metadata source querying the link-local IMDS endpoint.
#[derive(Debug, Clone)]
pub struct ImdsMetadata {
    url: String,
    timeout: Duration,
}

impl ImdsMetadata {
    /// Targets the standard Azure endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_url(METADATA_URL)
    }

    /// Targets a custom endpoint.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(METADATA_TIMEOUT_SECS),
        }
    }
}

impl Default for ImdsMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataSource for ImdsMetadata {
    fn lookup(&self) -> Result<InstanceMetadata, MetadataError> {
        debug!(target: METADATA_TARGET, url = %self.url, "querying instance metadata");
        let client = Client::builder()
            .timeout(self.timeout)
            .no_proxy()
            .build()
            .map_err(request_error)?;
        let response = client
            .get(&self.url)
            .header("Metadata", "true")
            .send()
            .map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.text().map_err(request_error)?;
        parse_instance_document(&body)
    }
}

fn request_error(error: reqwest::Error) -> MetadataError {
    MetadataError::Request {
        message: error.to_string(),
    }
}

fn parse_instance_document(body: &str) -> Result<InstanceMetadata, MetadataError> {
    let document: InstanceDocument =
        serde_json::from_str(body).map_err(|error| MetadataError::Malformed {
            message: error.to_string(),
        })?;
    Ok(InstanceMetadata {
        resource_group: document.compute.resource_group_name,
        subscription_id: document.compute.subscription_id,
    })
}

//! Seam for the instance metadata service that supplies resource group and
//! subscription defaults.

use thiserror::Error;

/// Values the metadata service reports for the local VM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceMetadata {
    /// Resource group of the local VM.
    pub resource_group: Option<String>,
    /// Subscription of the local VM.
    pub subscription_id: Option<String>,
}

/// Failures while querying instance metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// No metadata service is reachable from this host.
    #[error("metadata service unavailable")]
    Unavailable,
    /// The request failed in transport.
    #[error("metadata request failed: {message}")]
    Request {
        /// Transport error text.
        message: String,
    },
    /// The service replied with a non-success status.
    #[error("metadata service returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The reply body was not the expected document.
    #[error("metadata response was malformed: {message}")]
    Malformed {
        /// Decoder error text.
        message: String,
    },
}

/// Source of instance metadata.
pub trait MetadataSource {
    /// Fetches metadata for the local VM.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when the service cannot be reached or its
    /// reply cannot be decoded.
    fn lookup(&self) -> Result<InstanceMetadata, MetadataError>;
}

/// A source that never has metadata, for hosts outside Azure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataSource for NoMetadata {
    fn lookup(&self) -> Result<InstanceMetadata, MetadataError> {
        Err(MetadataError::Unavailable)
    }
}

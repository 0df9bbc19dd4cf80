//! EC2 instance-metadata lookups.
//!
//! Plain HTTP GETs against the link-local metadata endpoint, returning the
//! raw text values (zone, instance id) the connector name is built from.
//! The base URL is injectable for tests.

use std::time::Duration;

use tracing::debug;

use crate::error::CliError;

/// The production metadata endpoint.
pub const METADATA_URL: &str = "http://169.254.169.254/latest/meta-data/";

pub struct MetadataClient {
    http: reqwest::Client,
    base: String,
}

impl MetadataClient {
    pub fn new(base: impl Into<String>) -> Result<Self, CliError> {
        // Short timeout: off-EC2 the endpoint is unroutable and we want the
        // diagnostic quickly, not after the 30s default.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| CliError::Metadata {
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            base: base.into(),
        })
    }

    /// The availability zone of the current host (e.g. `us-west-2a`).
    pub async fn availability_zone(&self) -> Result<String, CliError> {
        self.get("placement/availability-zone").await
    }

    /// The instance id of the current host.
    pub async fn instance_id(&self) -> Result<String, CliError> {
        self.get("instance-id").await
    }

    async fn get(&self, path: &str) -> Result<String, CliError> {
        let url = format!("{}{path}", self.base);
        debug!("GET {url}");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CliError::Metadata {
                reason: format!("{path}: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CliError::Metadata {
                reason: format!("{path}: HTTP {status}"),
            });
        }

        resp.text().await.map_err(|e| CliError::Metadata {
            reason: format!("{path}: {e}"),
        })
    }
}

//! Publication Source
//!
//! HTTPS access to the published dataset. The two upstream methods share
//! one URL shape:
//!
//! ```text
//! https://<host>/<method>/<instance>?clientRequestId=<uuid>
//! ```
//!
//! [`PublicationSource`] is the seam the scheduler works against, so
//! tests can substitute a canned source for the HTTP one.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::config::EndpointsConfig;
use crate::publication::{self, EndpointSet};
use crate::{EndpointsError, Result};

/// Upstream dataset method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicationMethod {
    Version,
    Endpoints,
}

impl PublicationMethod {
    /// Path segment for the method
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Endpoints => "endpoints",
        }
    }
}

/// Source of raw publication bodies
#[async_trait]
pub trait PublicationSource: Send + Sync {
    /// Fetch the raw response body for one method
    async fn fetch(&self, method: PublicationMethod) -> Result<String>;
}

/// HTTPS publication source
pub struct HttpPublicationSource {
    client: reqwest::Client,
    base_url: String,
    instance: String,
}

impl HttpPublicationSource {
    /// Create a source from configuration
    pub fn new(config: &EndpointsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| EndpointsError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.service_url.trim_end_matches('/').to_string(),
            instance: config.instance.clone(),
        })
    }

    /// Build the request URL with a fresh client request id
    fn request_url(&self, method: PublicationMethod) -> String {
        format!(
            "{}/{}/{}?clientRequestId={}",
            self.base_url,
            method.as_str(),
            self.instance,
            Uuid::new_v4()
        )
    }
}

#[async_trait]
impl PublicationSource for HttpPublicationSource {
    async fn fetch(&self, method: PublicationMethod) -> Result<String> {
        let url = self.request_url(method);
        debug!("Fetching publication: {}", url);

        let response = self.client.get(&url).send().await.map_err(map_transport)?;

        if !response.status().is_success() {
            return Err(EndpointsError::Status(response.status().as_u16()));
        }

        response.text().await.map_err(map_transport)
    }
}

fn map_transport(e: reqwest::Error) -> EndpointsError {
    if e.is_timeout() {
        EndpointsError::Timeout
    } else {
        EndpointsError::Transport(e.to_string())
    }
}

/// Fetch and parse the current publication version
pub async fn fetch_version(source: &dyn PublicationSource) -> Result<String> {
    let body = source.fetch(PublicationMethod::Version).await?;
    Ok(publication::parse_version(&body)?.latest)
}

/// Fetch and parse the endpoint-set mapping
pub async fn fetch_endpoint_sets(
    source: &dyn PublicationSource,
) -> Result<HashMap<String, EndpointSet>> {
    let body = source.fetch(PublicationMethod::Endpoints).await?;
    publication::parse_endpoint_sets(&body)
}

//! Agent Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{EndpointsError, Result};

fn default_service_url() -> String {
    "https://endpoints.office.com".to_string()
}

fn default_instance() -> String {
    "worldwide".to_string()
}

fn default_version_check_interval() -> u64 {
    900
}

fn default_refresh_interval() -> u64 {
    3600
}

fn default_http_timeout() -> u64 {
    30
}

/// Endpoint ingestion configuration
///
/// Every field is optional in the file; omitted fields take the defaults
/// below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Publication base URL
    #[serde(default = "default_service_url")]
    pub service_url: String,
    /// Publication instance (e.g. `worldwide`)
    #[serde(default = "default_instance")]
    pub instance: String,
    /// Seconds between version probes
    #[serde(default = "default_version_check_interval")]
    pub version_check_interval_secs: u64,
    /// Seconds between refresh cycles
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// HTTP request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            instance: default_instance(),
            version_check_interval_secs: default_version_check_interval(),
            refresh_interval_secs: default_refresh_interval(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl EndpointsConfig {
    /// Load from a JSON file
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Reject unusable values
    pub fn validate(&self) -> Result<()> {
        if self.service_url.is_empty() {
            return Err(EndpointsError::Config(
                "service_url must not be empty".to_string(),
            ));
        }
        if self.version_check_interval_secs == 0 || self.refresh_interval_secs == 0 {
            return Err(EndpointsError::Config(
                "intervals must be nonzero".to_string(),
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(EndpointsError::Config(
                "http_timeout_secs must be nonzero".to_string(),
            ));
        }
        Ok(())
    }

    /// Version probe cadence
    pub fn version_check_interval(&self) -> Duration {
        Duration::from_secs(self.version_check_interval_secs)
    }

    /// Refresh cadence
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// HTTP request timeout
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

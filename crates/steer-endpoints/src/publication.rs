//! Publication Wire Format
//!
//! Serde types mirroring the published endpoint dataset JSON. The
//! `version` method returns a single object; the `endpoints` method
//! returns an object whose keys are arbitrary and whose values are
//! endpoint sets. Unknown fields are ignored, missing optionals default.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Response body of the `version` method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionPublication {
    pub latest: String,
}

/// One value of the `endpoints` mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSet {
    pub id: u32,
    pub service_area: String,
    #[serde(default)]
    pub service_area_display_name: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub ips: Vec<String>,
    #[serde(default)]
    pub tcp_ports: Option<String>,
    #[serde(default)]
    pub udp_ports: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub express_route: bool,
}

/// Parse a `version` response body
pub fn parse_version(body: &str) -> Result<VersionPublication> {
    Ok(serde_json::from_str(body)?)
}

/// Parse an `endpoints` response body
///
/// The publication is a JSON object keyed by opaque strings; a JSON
/// array is rejected as a parse error.
pub fn parse_endpoint_sets(body: &str) -> Result<HashMap<String, EndpointSet>> {
    Ok(serde_json::from_str(body)?)
}

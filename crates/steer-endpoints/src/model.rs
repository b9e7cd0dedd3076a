//! Dataset Model
//!
//! Immutable generation snapshots produced by the builder and served
//! through the store. A generation is never mutated after construction;
//! refresh builds a new one and swaps the pointer.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use ipnetwork::IpNetwork;

/// Synthetic service area unioning every published area
pub const ANY_AREA: &str = "any";

/// Normalized endpoint set retained for inspection
#[derive(Debug, Clone)]
pub struct EndpointRecord {
    pub id: u32,
    /// Canonical (lowercase) service area key
    pub service_area: String,
    pub display_name: String,
    /// Host patterns with wildcards stripped, lowercased
    pub host_patterns: Vec<String>,
    /// CIDR prefixes as published, verbatim
    pub ip_prefixes: Vec<String>,
    pub tcp_ports: Option<String>,
    pub udp_ports: Option<String>,
    pub category: Option<String>,
    pub required: bool,
    pub express_route: bool,
    pub notes: Option<String>,
}

/// Deduplicated union of every endpoint set in one service area
#[derive(Debug, Clone)]
pub struct ServiceAreaAggregate {
    /// Lowercase area key
    pub area: String,
    pub display_name: String,
    pub host_patterns: HashSet<String>,
    pub ip_networks: HashSet<IpNetwork>,
}

impl ServiceAreaAggregate {
    /// Create an empty aggregate for an area
    pub fn new(area: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            area: area.into(),
            display_name: display_name.into(),
            host_patterns: HashSet::new(),
            ip_networks: HashSet::new(),
        }
    }

    /// True when any stored pattern is a substring of the hostname
    ///
    /// Callers pass the hostname already lowercased.
    pub fn matches_host(&self, hostname: &str) -> bool {
        self.host_patterns.iter().any(|p| hostname.contains(p.as_str()))
    }

    /// True when any stored network contains the address
    pub fn matches_ip(&self, addr: IpAddr) -> bool {
        self.ip_networks.iter().any(|net| net.contains(addr))
    }
}

/// One immutable dataset snapshot
#[derive(Debug, Clone)]
pub struct DatasetGeneration {
    /// Publication version this generation was built from
    pub version: String,
    pub fetched_at: DateTime<Utc>,
    /// Normalized records, sorted by id
    pub records: Vec<EndpointRecord>,
    /// Aggregates keyed by lowercase area, always including `any`
    pub areas: HashMap<String, ServiceAreaAggregate>,
}

impl DatasetGeneration {
    /// Generation served before the first successful load
    pub fn empty() -> Self {
        let mut areas = HashMap::new();
        areas.insert(
            ANY_AREA.to_string(),
            ServiceAreaAggregate::new(ANY_AREA, ANY_AREA),
        );
        Self {
            version: String::new(),
            fetched_at: Utc::now(),
            records: Vec::new(),
            areas,
        }
    }

    /// Case-insensitive aggregate lookup
    pub fn area(&self, name: &str) -> Option<&ServiceAreaAggregate> {
        self.areas.get(&name.to_ascii_lowercase())
    }

    /// Counts snapshot for logging
    pub fn stats(&self) -> GenerationStats {
        let any = self.areas.get(ANY_AREA);
        GenerationStats {
            records: self.records.len(),
            areas: self.areas.len().saturating_sub(1),
            host_patterns: any.map(|a| a.host_patterns.len()).unwrap_or(0),
            ip_networks: any.map(|a| a.ip_networks.len()).unwrap_or(0),
        }
    }
}

/// Generation counts for logging
#[derive(Debug, Clone, Default)]
pub struct GenerationStats {
    pub records: usize,
    /// Published areas, excluding the synthetic `any`
    pub areas: usize,
    pub host_patterns: usize,
    pub ip_networks: usize,
}

//! Classification Queries
//!
//! Answers "does this hostname / address belong to service area X" against
//! the current generation. Host lookups fail closed on unknown areas; IP
//! lookups fail open, matching the upstream dataset semantics.

use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::store::DatasetStore;

/// Classification engine over the current dataset generation
pub struct QueryEngine {
    store: Arc<DatasetStore>,

    // Metrics
    host_queries: AtomicU64,
    ip_queries: AtomicU64,
}

impl QueryEngine {
    /// Create an engine reading from the given store
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self {
            store,
            host_queries: AtomicU64::new(0),
            ip_queries: AtomicU64::new(0),
        }
    }

    /// True when the hostname belongs to the service area
    ///
    /// Unknown areas answer false. Matching is case-insensitive substring
    /// containment, so the stored `.outlook.com` matches
    /// `smtp.outlook.com`.
    #[inline]
    pub fn classify_host(&self, area: &str, hostname: &str) -> bool {
        self.host_queries.fetch_add(1, Ordering::Relaxed);
        let generation = self.store.read();

        match generation.area(area) {
            Some(aggregate) => aggregate.matches_host(&hostname.to_ascii_lowercase()),
            None => false,
        }
    }

    /// True when the address belongs to the service area
    ///
    /// Unknown areas answer true (fail open); an address no published
    /// network contains answers false, as does an unparseable address.
    #[inline]
    pub fn classify_ip(&self, area: &str, ip: &str) -> bool {
        self.ip_queries.fetch_add(1, Ordering::Relaxed);
        let generation = self.store.read();

        let aggregate = match generation.area(area) {
            Some(a) => a,
            None => return true,
        };

        match ip.parse::<IpAddr>() {
            Ok(addr) => aggregate.matches_ip(addr),
            Err(_) => false,
        }
    }

    /// Get engine statistics
    pub fn stats(&self) -> QueryStats {
        let generation = self.store.read();
        QueryStats {
            host_queries: self.host_queries.load(Ordering::Relaxed),
            ip_queries: self.ip_queries.load(Ordering::Relaxed),
            records_loaded: generation.records.len(),
            generation_version: generation.version.clone(),
        }
    }

    /// Get dataset store reference
    pub fn store(&self) -> &Arc<DatasetStore> {
        &self.store
    }
}

/// Query statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct QueryStats {
    pub host_queries: u64,
    pub ip_queries: u64,
    pub records_loaded: usize,
    pub generation_version: String,
}

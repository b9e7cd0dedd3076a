//! Cloud Service Endpoint Classification
//!
//! Ingests a published cloud-service endpoint dataset over HTTPS and
//! serves lock-free classification queries against atomically swapped
//! in-memory generations.
//!
//! ## Features
//!
//! - **Periodic ingestion**: version probe every 15 minutes, full refresh
//!   every hour, both firing once at startup
//! - **Atomic generations**: readers never observe a partially built
//!   dataset
//! - **Per-area aggregates**: deduplicated host patterns and CIDR
//!   networks per service area, plus a synthetic `any` union
//! - **Fail-safe refresh**: a failed fetch or build keeps the previous
//!   generation serving and retries on the next cycle
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 ENDPOINT CLASSIFICATION AGENT                │
//! ├──────────────────────────────────────────────────────────────┤
//! │  version probe (15 min)         full refresh (1 h)           │
//! │        │                              │                      │
//! │        ▼                              ▼                      │
//! │  ┌────────────────┐  refresh   ┌──────────────────┐          │
//! │  │ VersionTracker │───needed──►│ RefreshScheduler │          │
//! │  └────────────────┘            └────────┬─────────┘          │
//! │                                         │ fetch + build      │
//! │                                         ▼                    │
//! │                          ┌─────────────────────────┐         │
//! │                          │ DatasetStore (ArcSwap)  │         │
//! │                          │ generation N            │         │
//! │                          └────────────┬────────────┘         │
//! │                                       │ lock-free read       │
//! │               ┌───────────────────────┼─────────────┐        │
//! │               ▼                       ▼             ▼        │
//! │         classify_host           classify_ip       stats      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod builder;
pub mod config;
pub mod fetch;
pub mod model;
pub mod publication;
pub mod query;
pub mod scheduler;
pub mod store;
pub mod version;

pub use builder::build_generation;
pub use config::EndpointsConfig;
pub use fetch::{HttpPublicationSource, PublicationMethod, PublicationSource};
pub use model::{
    DatasetGeneration, EndpointRecord, GenerationStats, ServiceAreaAggregate, ANY_AREA,
};
pub use publication::{EndpointSet, VersionPublication};
pub use query::{QueryEngine, QueryStats};
pub use scheduler::{RefreshScheduler, SchedulerStats};
pub use store::DatasetStore;
pub use version::VersionTracker;

use thiserror::Error;

/// Endpoint dataset errors
#[derive(Error, Debug)]
pub enum EndpointsError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid IP prefix in set {id}: {prefix}")]
    InvalidPrefix { id: u32, prefix: String },

    #[error("Duplicate endpoint set id: {0}")]
    DuplicateId(u32),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EndpointsError>;

//! Version Change Detection
//!
//! Tracks the last published version string and reports changes by plain
//! inequality. Version strings are never parsed or ordered: an upstream
//! rollback is still a change and still triggers a refresh.

use parking_lot::Mutex;
use tracing::warn;

use crate::fetch::{fetch_version, PublicationSource};

/// Last-observed publication version
pub struct VersionTracker {
    last_seen: Mutex<Option<String>>,
}

impl VersionTracker {
    /// Create a tracker with no version seen yet
    pub fn new() -> Self {
        Self {
            last_seen: Mutex::new(None),
        }
    }

    /// Record an observed version, returning true when it changed
    ///
    /// The first observation always counts as a change.
    pub fn observe(&self, latest: &str) -> bool {
        let mut last = self.last_seen.lock();
        let changed = last.as_deref() != Some(latest);
        *last = Some(latest.to_string());
        changed
    }

    /// Probe the upstream version, returning true on change
    ///
    /// Fetch or parse failures log a warning and return false without
    /// touching the recorded version.
    pub async fn check(&self, source: &dyn PublicationSource) -> bool {
        match fetch_version(source).await {
            Ok(latest) => self.observe(&latest),
            Err(e) => {
                warn!(error = %e, "Version check failed");
                false
            }
        }
    }

    /// Version recorded by the last successful probe
    pub fn last_seen(&self) -> Option<String> {
        self.last_seen.lock().clone()
    }
}

impl Default for VersionTracker {
    fn default() -> Self {
        Self::new()
    }
}

//! Lock-free generation store with hot-swapping
//!
//! Queries load the current [`DatasetGeneration`] without taking a lock;
//! refresh publishes a fully built replacement in one atomic store.
//! Readers always observe a complete generation, old or new.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};

use crate::model::DatasetGeneration;

/// Atomically swappable dataset generation
pub struct DatasetStore {
    /// Current generation (atomically swappable)
    current: ArcSwap<DatasetGeneration>,
    /// Successful swap count
    swaps: AtomicU64,
}

impl DatasetStore {
    /// Create a store serving the empty pre-load generation
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(DatasetGeneration::empty()),
            swaps: AtomicU64::new(0),
        }
    }

    /// Create with an initial generation
    pub fn with_generation(generation: DatasetGeneration) -> Self {
        Self {
            current: ArcSwap::from_pointee(generation),
            swaps: AtomicU64::new(1),
        }
    }

    /// Cheap read guard for query paths
    #[inline]
    pub fn read(&self) -> Guard<Arc<DatasetGeneration>> {
        self.current.load()
    }

    /// Owned handle for long-held references
    pub fn read_full(&self) -> Arc<DatasetGeneration> {
        self.current.load_full()
    }

    /// Atomically publish a new generation
    pub fn swap(&self, generation: DatasetGeneration) {
        self.current.store(Arc::new(generation));
        self.swaps.fetch_add(1, Ordering::Release);
    }

    /// Number of generations published so far
    #[inline]
    pub fn swap_count(&self) -> u64 {
        self.swaps.load(Ordering::Acquire)
    }

    /// True once at least one generation has been published
    pub fn has_committed(&self) -> bool {
        self.swap_count() > 0
    }
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

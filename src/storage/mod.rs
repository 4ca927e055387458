//! Storage module for crawl observations
//!
//! Workers append one [`PageObservation`] per fetched frontier entry while the crawl
//! runs. The store is append-only: records are never mutated or removed, and the resolver
//! reads a single snapshot once the frontier has drained.

mod observation;

pub use observation::{PageObservation, PageOutcome};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Append-only, concurrently writable log of page observations
#[derive(Debug, Default)]
pub struct ObservationStore {
    records: Mutex<Vec<PageObservation>>,
}

impl ObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an observation (no ordering guarantee among concurrent writers)
    pub fn append(&self, observation: PageObservation) {
        self.lock().push(observation);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies the current records
    pub fn snapshot(&self) -> Vec<PageObservation> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PageObservation>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

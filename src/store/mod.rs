//! Versioned shared documents with optimistic compare-and-swap.
//!
//! The cutover policy and the metrics snapshot are read-modify-write documents
//! shared by every request. Writers never overwrite blindly: each write names
//! the version it read, and a stale writer gets [`StoreError::VersionConflict`]
//! and retries against the fresh document (see [`update`]).

pub mod error;
pub mod file;
pub mod memory;


pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryDocumentStore;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{CAS_BACKOFF_MAX_STEPS, CAS_BACKOFF_STEP_MICROS, MAX_CAS_RETRIES};

/// A document together with its monotonically increasing version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// Starts at 1 for the first write.
    pub version: u64,
    /// Document body.
    pub data: T,
}

/// Storage for a single versioned document.
pub trait DocumentStore<T>: Send + Sync {
    /// Returns the current document, or `None` if nothing has been written yet.
    fn load(&self) -> StoreResult<Option<Versioned<T>>>;

    /// Writes `value` iff the stored version still equals `expected`
    /// (`None` meaning "no document yet"). Returns the new version.
    fn compare_and_swap(&self, expected: Option<u64>, value: &T) -> StoreResult<u64>;
}

/// Pause before retry `attempt`: grows linearly, capped at
/// `CAS_BACKOFF_STEP_MICROS * CAS_BACKOFF_MAX_STEPS`.
pub(crate) fn retry_backoff(attempt: usize) -> Duration {
    let steps = attempt.clamp(1, CAS_BACKOFF_MAX_STEPS) as u64;
    Duration::from_micros(CAS_BACKOFF_STEP_MICROS * steps)
}

/// Applies `mutate` to the current document and commits it with CAS, retrying
/// on conflicts. Returns the committed document and `mutate`'s output.
///
/// A missing document starts from `default()`. So does a corrupt one, so a
/// damaged file is repaired by the next successful write.
pub fn update<T, S, D, F, R>(store: &S, default: D, mut mutate: F) -> StoreResult<(T, R)>
where
    S: DocumentStore<T> + ?Sized,
    D: Fn() -> T,
    F: FnMut(&mut T) -> R,
{
    for attempt in 1..=MAX_CAS_RETRIES {
        let (expected, mut doc) = match store.load() {
            Ok(Some(current)) => (Some(current.version), current.data),
            Ok(None) => (None, default()),
            Err(e) if e.is_corrupt() => {
                warn!(error = %e, "Stored document unreadable, rebuilding from defaults");
                (None, default())
            }
            Err(e) => return Err(e),
        };

        let output = mutate(&mut doc);

        match store.compare_and_swap(expected, &doc) {
            Ok(_) => return Ok((doc, output)),
            Err(StoreError::VersionConflict { expected, found }) => {
                debug!(attempt, ?expected, ?found, "CAS conflict, retrying");
                std::thread::sleep(retry_backoff(attempt));
            }
            Err(e) => return Err(e),
        }
    }

    Err(StoreError::RetriesExhausted {
        attempts: MAX_CAS_RETRIES,
    })
}

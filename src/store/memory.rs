use parking_lot::Mutex;

use super::{DocumentStore, StoreError, StoreResult, Versioned};

/// In-process document store. Shared by cloning an `Arc` around it.
#[derive(Debug)]
pub struct MemoryDocumentStore<T> {
    slot: Mutex<Option<Versioned<T>>>,
}

impl<T> Default for MemoryDocumentStore<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T> MemoryDocumentStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `data` at version 1.
    pub fn with_document(data: T) -> Self {
        Self {
            slot: Mutex::new(Some(Versioned { version: 1, data })),
        }
    }

    /// Current version, if any document was written.
    pub fn version(&self) -> Option<u64> {
        self.slot.lock().as_ref().map(|v| v.version)
    }
}

impl<T: Clone + Send> DocumentStore<T> for MemoryDocumentStore<T> {
    fn load(&self) -> StoreResult<Option<Versioned<T>>> {
        Ok(self.slot.lock().clone())
    }

    fn compare_and_swap(&self, expected: Option<u64>, value: &T) -> StoreResult<u64> {
        let mut slot = self.slot.lock();
        let found = slot.as_ref().map(|v| v.version);
        if found != expected {
            return Err(StoreError::VersionConflict { expected, found });
        }

        let version = found.map_or(1, |v| v + 1);
        *slot = Some(Versioned {
            version,
            data: value.clone(),
        });
        Ok(version)
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::{Storage, StorageError};

/// In-process storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of writes received since creation.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.blob())
    }

    fn write(&self, blob: &str) -> Result<(), StorageError> {
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(blob.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

use std::sync::{Arc, OnceLock};

use crate::error::AppError;
use crate::services::CourseStore;

/// Set-once slot for the course store shared by request handlers.
#[derive(Clone, Default)]
pub struct StoreHandle {
    inner: Arc<OnceLock<Arc<CourseStore>>>,
}

impl StoreHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialized(store: Arc<CourseStore>) -> Self {
        let handle = Self::new();
        handle.inner.get_or_init(|| store);
        handle
    }

    /// Installs the store. Hands it back if one is already installed.
    pub fn init(&self, store: Arc<CourseStore>) -> Result<(), Arc<CourseStore>> {
        self.inner.set(store)
    }

    pub fn get(&self) -> Result<&CourseStore, AppError> {
        self.inner
            .get()
            .map(|store| store.as_ref())
            .ok_or(AppError::NotInitialized)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_uninitialized_handle_fails_fast() {
        let handle = StoreHandle::new();
        assert!(matches!(handle.get(), Err(AppError::NotInitialized)));
    }

    #[test]
    fn test_init_once() {
        let handle = StoreHandle::new();
        let shared = handle.clone();

        let store = Arc::new(CourseStore::load(Arc::new(MemoryStorage::new())));
        assert!(handle.init(store.clone()).is_ok());
        assert!(shared.get().is_ok());
        assert!(handle.init(store).is_err());
    }
}

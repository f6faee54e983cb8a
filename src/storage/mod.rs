//! Durable storage for the course document.
//!
//! Every backend keeps a single text blob under one key. The store reads it
//! once at startup and overwrites it after each mutation.

pub mod file;
pub mod memory;
pub mod sqlite;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use crate::config::StorageConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to {operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("failed to serialize course data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage writer has shut down")]
    Closed,
}

/// Key-value persistence holding one serialized document.
pub trait Storage: Send + Sync {
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&self, blob: &str) -> Result<(), StorageError>;
}

/// A configured backend, kept concrete so callers can flush queued writes
/// on shutdown.
pub enum Backend {
    Memory(Arc<MemoryStorage>),
    File(Arc<FileStorage>),
    Sqlite(Arc<SqliteStorage>),
}

impl Backend {
    pub async fn open(config: &StorageConfig, key: &str) -> Result<Self, StorageError> {
        let backend = match config {
            StorageConfig::Memory => Backend::Memory(Arc::new(MemoryStorage::new())),
            StorageConfig::File(path) => Backend::File(Arc::new(FileStorage::from_config(path, key))),
            StorageConfig::Sqlite(url) => {
                Backend::Sqlite(Arc::new(SqliteStorage::connect(url, key).await?))
            }
        };
        Ok(backend)
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        match self {
            Backend::Memory(s) => s.clone(),
            Backend::File(s) => s.clone(),
            Backend::Sqlite(s) => s.clone(),
        }
    }

    /// Waits until every write issued so far has reached the backend.
    pub async fn flush(&self) -> Result<(), StorageError> {
        match self {
            Backend::Sqlite(s) => s.flush().await,
            Backend::Memory(_) | Backend::File(_) => Ok(()),
        }
    }
}

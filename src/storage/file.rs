use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Storage, StorageError};

/// Stores the blob in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// `<dir>/<key>.json`.
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    /// Exactly `path`, whatever the key.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A configured path ending in `.json` names the file itself; anything
    /// else is a directory holding `<key>.json`.
    pub fn from_config(path: &Path, key: &str) -> Self {
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::at(path)
        } else {
            Self::new(path, key)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(operation: &'static str, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Storage for FileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error("read", &self.path, e)),
        }
    }

    /// Writes to a sibling temp file and renames it over the target, so a
    /// crash never leaves a half-written document behind.
    fn write(&self, blob: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Self::io_error("create directory", parent, e))?;
        }

        let temp_path = self.path.with_extension("json.tmp");

        let mut file =
            File::create(&temp_path).map_err(|e| Self::io_error("create", &temp_path, e))?;
        file.write_all(blob.as_bytes())
            .map_err(|e| Self::io_error("write", &temp_path, e))?;
        file.sync_all()
            .map_err(|e| Self::io_error("sync", &temp_path, e))?;

        fs::rename(&temp_path, &self.path)
            .map_err(|e| Self::io_error("rename", &self.path, e))?;

        debug!("saved course data to {}", self.path.display());
        Ok(())
    }
}

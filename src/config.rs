use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

pub const DEFAULT_STORE: &str = "sqlite://course_site.db";
pub const DEFAULT_STORE_KEY: &str = "courseData";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageConfig {
    Memory,
    /// A `.json` file, or a directory holding `<key>.json`.
    File(PathBuf),
    /// sqlx connection URL.
    Sqlite(String),
}

impl StorageConfig {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if raw == "memory" {
            return Ok(StorageConfig::Memory);
        }
        if let Some(path) = raw.strip_prefix("file://") {
            if path.is_empty() {
                return Err(AppError::Config("file:// store needs a path".to_string()));
            }
            return Ok(StorageConfig::File(PathBuf::from(path)));
        }
        if raw.starts_with("sqlite:") {
            return Ok(StorageConfig::Sqlite(raw.to_string()));
        }
        Err(AppError::Config(format!(
            "unsupported COURSE_STORE '{}' (expected memory, file://<path> or sqlite://<path>)",
            raw
        )))
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub store_key: String,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = StorageConfig::parse(
            &lookup("COURSE_STORE").unwrap_or_else(|| DEFAULT_STORE.to_string()),
        )?;

        let store_key = lookup("COURSE_STORE_KEY")
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_KEY.to_string());

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        Ok(Self {
            storage,
            store_key,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).expect("defaults should parse");
        assert_eq!(config.storage, StorageConfig::Sqlite(DEFAULT_STORE.to_string()));
        assert_eq!(config.store_key, "courseData");
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn test_storage_variants() {
        assert_eq!(StorageConfig::parse("memory").unwrap(), StorageConfig::Memory);
        assert_eq!(
            StorageConfig::parse("file://data").unwrap(),
            StorageConfig::File(PathBuf::from("data"))
        );
        assert_eq!(
            StorageConfig::parse("sqlite::memory:").unwrap(),
            StorageConfig::Sqlite("sqlite::memory:".to_string())
        );
        assert_eq!(
            StorageConfig::parse("file://data/course.json").unwrap(),
            StorageConfig::File(PathBuf::from("data/course.json"))
        );
        assert!(matches!(StorageConfig::parse("file://"), Err(AppError::Config(_))));
        assert!(matches!(StorageConfig::parse("redis://x"), Err(AppError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("COURSE_STORE", "memory"),
            ("COURSE_STORE_KEY", "fall2023"),
            ("BIND_ADDR", "0.0.0.0:8080"),
        ])
        .expect("config should parse");

        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.store_key, "fall2023");
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = config_from(&[("BIND_ADDR", "localhost")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}

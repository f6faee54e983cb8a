use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use super::{Storage, StorageError};

enum WriteCommand {
    Put(String),
    Flush(oneshot::Sender<()>),
}

/// SQLite-backed storage.
///
/// sqlx is async while [`Storage`] is not, so writes are handed to a single
/// background task over an unbounded channel. The task applies them one at a
/// time in the order they were issued. Reads are served from the last blob
/// written through this handle.
pub struct SqliteStorage {
    key: String,
    latest: Mutex<Option<String>>,
    tx: mpsc::UnboundedSender<WriteCommand>,
    failed_writes: Arc<AtomicUsize>,
}

impl SqliteStorage {
    pub async fn connect(url: &str, key: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::open(pool, key).await
    }

    /// Runs migrations, loads the current blob and starts the writer task.
    /// Must be called inside a tokio runtime.
    pub async fn open(pool: SqlitePool, key: &str) -> Result<Self, StorageError> {
        sqlx::migrate!("./migrations").run(&pool).await?;

        let current = fetch_blob(&pool, key).await?;
        info!(
            "opened sqlite storage (key: {}, existing data: {})",
            key,
            current.is_some()
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let failed_writes = Arc::new(AtomicUsize::new(0));
        tokio::spawn(run_writer(pool, key.to_string(), rx, failed_writes.clone()));

        Ok(Self {
            key: key.to_string(),
            latest: Mutex::new(current),
            tx,
            failed_writes,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Background writes that failed. Each failure is also logged.
    pub fn failed_writes(&self) -> usize {
        self.failed_writes.load(Ordering::SeqCst)
    }

    /// Resolves once every write queued before this call has been applied.
    pub async fn flush(&self) -> Result<(), StorageError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(WriteCommand::Flush(done_tx))
            .map_err(|_| StorageError::Closed)?;
        done_rx.await.map_err(|_| StorageError::Closed)
    }
}

impl Storage for SqliteStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.latest.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn write(&self, blob: &str) -> Result<(), StorageError> {
        self.tx
            .send(WriteCommand::Put(blob.to_string()))
            .map_err(|_| StorageError::Closed)?;
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(blob.to_string());
        Ok(())
    }
}

async fn run_writer(
    pool: SqlitePool,
    key: String,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
    failed_writes: Arc<AtomicUsize>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Put(blob) => {
                if let Err(e) = upsert_blob(&pool, &key, &blob).await {
                    failed_writes.fetch_add(1, Ordering::SeqCst);
                    error!("failed to persist course data: {}", e);
                }
            }
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("sqlite writer for {} stopped", key);
}

pub async fn fetch_blob(db: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await
}

pub async fn upsert_blob(db: &SqlitePool, key: &str, blob: &str) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO kv_store (key, value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE
        SET value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(blob)
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}

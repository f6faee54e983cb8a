use std::sync::Arc;

use course_site::{
    config::StorageConfig,
    models::{CourseData, NewAnnouncementRequest, NewDeadlineRequest},
    services::{CourseStore, default_course_data},
    storage::{Backend, SqliteStorage, Storage},
};
use sqlx::sqlite::SqlitePoolOptions;

fn quiz() -> NewDeadlineRequest {
    NewDeadlineRequest {
        title: "Quiz".to_string(),
        description: "pop quiz".to_string(),
        due_date: "2023-09-01".to_string(),
    }
}

#[test]
fn test_course_data_round_trip() {
    let data = default_course_data();
    let json = serde_json::to_string(&data).expect("Failed to serialize");
    let back: CourseData = serde_json::from_str(&json).expect("Failed to deserialize");
    assert_eq!(back, data);
}

#[test]
fn test_serialized_shape() {
    let value = serde_json::to_value(default_course_data()).expect("Failed to serialize");

    assert!(value.get("courseDetails").is_some());
    assert_eq!(value["announcements"][0]["important"], true);
    assert!(value["announcements"][1].get("important").is_none());
    assert_eq!(value["deadlines"][0]["dueDate"], "2023-09-05");
    assert!(value["deadlines"][0].get("completed").is_none());
}

#[tokio::test]
async fn test_sqlite_store_survives_restart() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    let storage = Arc::new(
        SqliteStorage::open(pool.clone(), "courseData")
            .await
            .expect("Failed to open storage"),
    );
    let store = CourseStore::load(storage.clone());
    store.add_deadline(quiz()).expect("add failed");
    store
        .add_announcement(NewAnnouncementRequest {
            title: "Welcome back".to_string(),
            content: "Second half starts now.".to_string(),
            important: None,
        })
        .expect("add failed");
    store.delete_deadline("4").expect("delete failed");
    storage.flush().await.expect("flush failed");

    let reopened = SqliteStorage::open(pool, "courseData")
        .await
        .expect("Failed to reopen storage");
    let restarted = CourseStore::load(Arc::new(reopened));

    assert_eq!(*restarted.snapshot(), *store.snapshot());
    assert_eq!(restarted.snapshot().deadlines.len(), 4);
    assert_eq!(restarted.snapshot().announcements[0].title, "Welcome back");
}

#[tokio::test]
async fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = StorageConfig::File(dir.path().to_path_buf());

    let backend = Backend::open(&config, "courseData")
        .await
        .expect("Failed to open backend");
    let store = CourseStore::load(backend.storage());
    store.add_deadline(quiz()).expect("add failed");
    backend.flush().await.expect("flush failed");

    let backend = Backend::open(&config, "courseData")
        .await
        .expect("Failed to reopen backend");
    let restarted = CourseStore::load(backend.storage());

    assert_eq!(restarted.snapshot().deadlines[0].title, "Quiz");
    assert_eq!(*restarted.snapshot(), *store.snapshot());
}

#[tokio::test]
async fn test_malformed_blob_is_replaced_on_next_write() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("courseData.json"), "not json").expect("write failed");

    let backend = Backend::open(&StorageConfig::File(dir.path().to_path_buf()), "courseData")
        .await
        .expect("Failed to open backend");
    let storage = backend.storage();
    let store = CourseStore::load(storage.clone());
    assert_eq!(*store.snapshot(), default_course_data());

    store.delete_announcement("nonexistent-id").expect("delete failed");

    let saved: CourseData = serde_json::from_str(
        &storage.read().expect("read failed").expect("nothing saved"),
    )
    .expect("saved blob should parse");
    assert_eq!(saved, default_course_data());
}

#[tokio::test]
async fn test_memory_backend_starts_empty() {
    let backend = Backend::open(&StorageConfig::Memory, "courseData")
        .await
        .expect("Failed to open backend");
    assert!(backend.storage().read().expect("read failed").is_none());
    backend.flush().await.expect("flush failed");
}

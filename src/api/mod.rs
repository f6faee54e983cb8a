use axum::Json;
use axum::extract::Path;
use axum::routing::put;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct AnnouncementUpdate {
    title: String,
    content: String,
    #[serde(default)]
    important: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeadlineUpdate {
    title: String,
    description: String,
    due_date: String,
    #[serde(default)]
    completed: Option<bool>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/course", get(get_course))
        .route("/course/details", put(set_course_details))
        .route("/announcements", get(list_announcements).post(create_announcement))
        .route(
            "/announcements/{id}",
            get(get_announcement)
                .put(update_announcement)
                .delete(delete_announcement),
        )
        .route("/deadlines", get(list_deadlines).post(create_deadline))
        .route(
            "/deadlines/{id}",
            get(get_deadline).put(update_deadline).delete(delete_deadline),
        )
        .with_state(state)
}

fn require(missing: Vec<&'static str>) -> Result<(), AppError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::missing_fields(&missing))
    }
}

/// An update racing a delete commits as a no-op; the snapshot it returns
/// no longer holds the id.
fn ensure_announcement(data: &CourseData, id: &str) -> Result<(), AppError> {
    if data.announcements.iter().any(|a| a.id == id) {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

fn ensure_deadline(data: &CourseData, id: &str) -> Result<(), AppError> {
    if data.deadlines.iter().any(|d| d.id == id) {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.get()?;
    Ok(StatusCode::OK)
}

async fn get_course(State(state): State<AppState>) -> Result<Json<CourseData>, AppError> {
    let data = state.store.get()?.snapshot();
    Ok(Json(CourseData::clone(&data)))
}

async fn set_course_details(
    State(state): State<AppState>,
    Json(details): Json<CourseDetails>
) -> Result<Json<CourseData>, AppError> {
    require(details.missing_fields())?;
    let data = state.store.get()?.set_course_details(details)?;
    Ok(Json(CourseData::clone(&data)))
}

async fn list_announcements(
    State(state): State<AppState>
) -> Result<Json<Vec<Announcement>>, AppError> {
    let data = state.store.get()?.snapshot();
    Ok(Json(data.announcements.clone()))
}

async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Announcement>, AppError> {
    let data = state.store.get()?.snapshot();
    let announcement = data
        .announcements
        .iter()
        .find(|a| a.id == id)
        .cloned()
        .ok_or(AppError::NotFound)?;
    Ok(Json(announcement))
}

async fn create_announcement(
    State(state): State<AppState>,
    Json(req): Json<NewAnnouncementRequest>
) -> Result<(StatusCode, Json<CourseData>), AppError> {
    require(req.missing_fields())?;
    let data = state.store.get()?.add_announcement(req)?;
    Ok((StatusCode::CREATED, Json(CourseData::clone(&data))))
}

/// The creation date is kept from the stored announcement.
async fn update_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AnnouncementUpdate>
) -> Result<Json<CourseData>, AppError> {
    require(required(&[("title", &req.title), ("content", &req.content)]))?;

    let store = state.store.get()?;
    let existing = store
        .snapshot()
        .announcements
        .iter()
        .find(|a| a.id == id)
        .cloned()
        .ok_or(AppError::NotFound)?;

    let data = store.update_announcement(Announcement {
        id: id.clone(),
        title: req.title,
        content: req.content,
        date: existing.date,
        important: req.important,
    })?;
    ensure_announcement(&data, &id)?;
    Ok(Json(CourseData::clone(&data)))
}

async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    state.store.get()?.delete_announcement(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_deadlines(
    State(state): State<AppState>
) -> Result<Json<Vec<DeadlineStatus>>, AppError> {
    let store = state.store.get()?;
    let today = store.today();
    let deadlines: Vec<DeadlineStatus> = store
        .snapshot()
        .deadlines
        .iter()
        .cloned()
        .map(|d| DeadlineStatus::new(d, today))
        .collect();
    Ok(Json(deadlines))
}

async fn get_deadline(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<DeadlineStatus>, AppError> {
    let store = state.store.get()?;
    let deadline = store
        .snapshot()
        .deadlines
        .iter()
        .find(|d| d.id == id)
        .cloned()
        .ok_or(AppError::NotFound)?;
    Ok(Json(DeadlineStatus::new(deadline, store.today())))
}

async fn create_deadline(
    State(state): State<AppState>,
    Json(req): Json<NewDeadlineRequest>
) -> Result<(StatusCode, Json<CourseData>), AppError> {
    require(req.missing_fields())?;
    let data = state.store.get()?.add_deadline(req)?;
    Ok((StatusCode::CREATED, Json(CourseData::clone(&data))))
}

async fn update_deadline(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DeadlineUpdate>
) -> Result<Json<CourseData>, AppError> {
    require(required(&[
        ("title", &req.title),
        ("description", &req.description),
        ("dueDate", &req.due_date),
    ]))?;

    let store = state.store.get()?;
    if !store.snapshot().deadlines.iter().any(|d| d.id == id) {
        return Err(AppError::NotFound);
    }

    let data = store.update_deadline(Deadline {
        id: id.clone(),
        title: req.title,
        description: req.description,
        due_date: req.due_date,
        completed: req.completed,
    })?;
    ensure_deadline(&data, &id)?;
    Ok(Json(CourseData::clone(&data)))
}

async fn delete_deadline(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    state.store.get()?.delete_deadline(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

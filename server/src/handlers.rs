// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::AppState;
use axum::{
    extract::{Json, Path, Query as QueryParams, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use planner_common::{
    EXPORT_FILE_NAME, ImportError, Query, Task, TaskFields, TaskPatch, TaskView,
};
use serde::Serialize;
use tracing::{debug, error, info};

/// Body of `GET /api/tasks`.
#[derive(Serialize, Debug)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskView>,
    /// Completion percentage over the whole store, not just the listed tasks.
    pub progress: u8,
    pub total: usize,
}

/// Handler for listing tasks through the filter, sort and search controls.
pub async fn list_tasks(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<Query>,
) -> Json<TaskListResponse> {
    debug!("Listing tasks with {:?}", query);
    let store = state.store.lock();
    let tasks = planner_common::render(store.tasks(), &query, store.now());
    info!("Successfully retrieved {} tasks.", tasks.len());

    Json(TaskListResponse {
        tasks,
        progress: store.progress(),
        total: store.tasks().len(),
    })
}

/// Handler for fetching a single task, e.g. to fill an edit form.
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let store = state.store.lock();
    match store.get(&task_id) {
        Some(task) => Ok(Json(task.clone())),
        None => Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Task with ID {task_id} not found."),
        )),
    }
}

/// Handler for creating a new task. A blank title creates nothing.
pub async fn create_task(
    State(state): State<AppState>,
    Json(fields): Json<TaskFields>, // Extracting the request body as JSON
) -> Result<Response, AppError> {
    debug!("Received request to create task: {:?}", fields.title);

    let created = state.store.lock().create(fields)?;

    Ok(match created {
        // Return a 201 Created status with the new task as JSON.
        Some(task) => (StatusCode::CREATED, Json(task)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Handler for editing a task. Unknown IDs and blank titles change nothing.
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Response, AppError> {
    debug!("Received request to update task with ID: {}", task_id);

    let updated = state.store.lock().update(&task_id, patch)?;

    Ok(match updated {
        Some(task) => Json(task).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Handler for deleting a task by ID. Deleting an unknown ID is not an error.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>, // Extract task ID from the URL path
) -> Result<StatusCode, AppError> {
    debug!("Attempting to delete task with ID: {}", task_id);

    state.store.lock().delete(&task_id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for flipping a task between done and not done.
pub async fn toggle_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Response, AppError> {
    debug!("Attempting to toggle task with ID: {}", task_id);

    let toggled = state.store.lock().toggle_complete(&task_id)?;

    Ok(match toggled {
        Some(task) => Json(task).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Handler for downloading the full task list as a JSON file.
pub async fn export_tasks(State(state): State<AppState>) -> Result<Response, AppError> {
    let document = state.store.lock().export()?;
    info!("Exporting {} bytes of tasks.", document.len());

    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    )
        .into_response())
}

/// Handler for importing an uploaded task file. The raw body is the file text.
pub async fn import_tasks(
    State(state): State<AppState>,
    document: String,
) -> Result<Json<serde_json::Value>, AppError> {
    debug!("Received import of {} bytes.", document.len());

    let imported = state.store.lock().import(&document)?;

    Ok(Json(serde_json::json!({
        "message": "Imported successfully.",
        "imported": imported
    })))
}

// --- Custom Error Handling ---

/// Our custom error type for the application.
#[derive(Debug)]
pub struct AppError {
    code: StatusCode,
    message: String,
}

impl AppError {
    fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }
}

/// Storage failures from the task store become a 500.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Log the internal error for debugging.
        error!("Internal server error: {:?}", err);
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred.".to_string(),
        }
    }
}

/// A rejected import document is the caller's problem; a failed save is ours.
impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Storage(inner) => inner.into(),
            other => Self::new(StatusCode::BAD_REQUEST, &format!("Import failed: {other}")),
        }
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(
            "Responding with error: status_code={}, message={}",
            self.code.as_u16(),
            self.message
        );
        (
            self.code,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use planner_common::{FixedClock, MemoryStore, TaskStore};

    fn test_state() -> AppState {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
        AppState::new(TaskStore::open(MemoryStore::new(), clock))
    }

    // Helper to create a payload for tests
    fn create_test_payload(title: &str) -> Json<TaskFields> {
        Json(TaskFields {
            title: title.to_string(),
            ..TaskFields::default()
        })
    }

    #[tokio::test]
    async fn test_create_task_with_empty_title_is_ignored() {
        let state = test_state();

        let response = create_task(State(state.clone()), create_test_payload("   "))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.store.lock().tasks().len(), 3);
    }

    #[tokio::test]
    async fn test_create_task_returns_created() {
        let state = test_state();

        let response = create_task(State(state.clone()), create_test_payload("Revise"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(state.store.lock().tasks()[0].title, "Revise");
    }

    #[tokio::test]
    async fn test_get_unknown_task_is_not_found() {
        let state = test_state();

        let err = get_task(State(state), Path("missing".to_string()))
            .await
            .unwrap_err();

        assert_eq!(err.code, StatusCode::NOT_FOUND);
        assert!(err.message.contains("missing"));
    }

    #[tokio::test]
    async fn test_import_of_object_is_bad_request() {
        let state = test_state();

        let err = import_tasks(State(state.clone()), r#"{"id":"x"}"#.to_string())
            .await
            .unwrap_err();

        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Import failed: Expected array of tasks");
        assert_eq!(state.store.lock().tasks().len(), 3);
    }
}

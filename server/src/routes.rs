// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Creates and configures the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // `GET /api/tasks` lists through the query pipeline, `POST` creates
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/api/tasks/{id}/toggle", post(handlers::toggle_task))
        .route("/api/export", get(handlers::export_tasks))
        .route("/api/import", post(handlers::import_tasks))
        // Adds the shared task store to the application state
        .with_state(state)
}

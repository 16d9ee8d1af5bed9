// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
pub mod config;
pub mod file_store;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use parking_lot::Mutex;
use planner_common::TaskStore;

/// State shared by every handler: the one task store, behind a lock so
/// requests apply one at a time.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<TaskStore>>,
}

impl AppState {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

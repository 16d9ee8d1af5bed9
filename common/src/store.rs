// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Map;
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::storage::{self, KeyValueStore};
use crate::transfer::{self, ImportError};
use crate::{Task, TaskFields, TaskPatch, view};

/// Owns the ordered task list (newest first) and writes it back to storage
/// after every change.
pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
}

impl TaskStore {
    /// Loads the saved list from `backend`, seeding demo tasks on first use.
    pub fn open(backend: impl KeyValueStore + 'static, clock: impl Clock + 'static) -> Self {
        let mut backend: Box<dyn KeyValueStore> = Box::new(backend);
        let tasks = storage::load(backend.as_mut(), &clock);
        info!("Task store opened with {} tasks.", tasks.len());
        Self {
            tasks,
            storage: backend,
            clock: Box::new(clock),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Percentage of completed tasks, rounded.
    pub fn progress(&self) -> u8 {
        view::progress(&self.tasks)
    }

    /// Adds a task at the front of the list.
    ///
    /// Returns `Ok(None)` without touching anything when the title is blank.
    pub fn create(&mut self, fields: TaskFields) -> Result<Option<Task>> {
        let title = fields.title.trim();
        if title.is_empty() {
            debug!("Ignoring create with an empty title.");
            return Ok(None);
        }

        let task = Task {
            id: self.fresh_id(),
            title: title.to_string(),
            desc: fields.desc.trim().to_string(),
            due: fields.due,
            priority: fields.priority,
            tags: fields.tags,
            completed: false,
            created_at: Some(self.clock.now()),
            extra: Map::new(),
        };
        self.tasks.insert(0, task.clone());
        self.persist()?;

        info!("Task created with ID: {}", task.id);
        Ok(Some(task))
    }

    /// Merges `patch` onto the task with `id`.
    ///
    /// Unknown ids and blank titles leave the store untouched and return `Ok(None)`.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Option<Task>> {
        let title = match patch.title.as_deref().map(str::trim) {
            Some("") => {
                debug!("Ignoring update of {} with an empty title.", id);
                return Ok(None);
            }
            title => title.map(str::to_string),
        };
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!("No task with ID {} to update.", id);
            return Ok(None);
        };

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(desc) = patch.desc {
            task.desc = desc.trim().to_string();
        }
        if let Some(due) = patch.due {
            task.due = due;
            task.clear_raw("due");
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
            task.clear_raw("priority");
        }
        if let Some(tags) = patch.tags {
            task.tags = tags;
            task.clear_raw("tags");
        }
        let updated = task.clone();
        self.persist()?;

        info!("Task with ID {} updated.", id);
        Ok(Some(updated))
    }

    /// Removes every task with `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = before - self.tasks.len();
        if removed == 0 {
            debug!("No task with ID {} to delete.", id);
            return Ok(false);
        }
        self.persist()?;

        info!("Deleted {} task(s) with ID {}.", removed, id);
        Ok(true)
    }

    /// Flips the completion flag of the task with `id`.
    pub fn toggle_complete(&mut self, id: &str) -> Result<Option<Task>> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!("No task with ID {} to toggle.", id);
            return Ok(None);
        };
        task.completed = !task.completed;
        task.clear_raw("completed");
        let toggled = task.clone();
        self.persist()?;

        info!("Task with ID {} marked completed={}.", id, toggled.completed);
        Ok(Some(toggled))
    }

    /// Parses `document` and puts its records in front of the current list.
    ///
    /// Records are not deduplicated against existing ones. On a parse error
    /// the store is left as it was.
    pub fn import(&mut self, document: &str) -> Result<usize, ImportError> {
        let mut merged = transfer::parse_import(document)?;
        let imported = merged.len();
        merged.append(&mut self.tasks);
        self.tasks = merged;
        self.persist().map_err(ImportError::Storage)?;

        info!("Imported {} tasks, store now holds {}.", imported, self.tasks.len());
        Ok(imported)
    }

    /// The full list as a pretty-printed JSON document.
    pub fn export(&self) -> Result<String> {
        transfer::export(&self.tasks).context("Failed to serialize tasks for export")
    }

    fn persist(&mut self) -> Result<()> {
        storage::save(self.storage.as_mut(), &self.tasks)
    }

    // Imported records may carry any id, so a fresh one is checked against
    // the whole list.
    fn fresh_id(&self) -> String {
        loop {
            let id = format!("t_{}", Uuid::now_v7().simple());
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

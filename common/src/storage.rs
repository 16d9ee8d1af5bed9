// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Days, Utc};
use parking_lot::Mutex;
use serde_json::Map;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::{Priority, Task};

/// The single key the whole task list lives under.
pub const STORAGE_KEY: &str = "study_planner_tasks_v1";

/// A byte-oriented key-value store, the way browser local storage is one.
pub trait KeyValueStore: Send {
    /// Returns `None` when nothing was ever written under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replaces whatever is stored under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// In-memory store. Clones share the same entries, so a caller can keep a
/// handle to inspect what a [`crate::TaskStore`] wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `value` under `key`.
    pub fn with_entry(key: &str, value: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.entries.lock().insert(key.to_string(), value.into());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Reads the task list from `storage`.
///
/// Nothing stored yet: the demo seed is returned and written back right away.
/// Unreadable or corrupt data: the failure is logged and the list starts
/// empty. The corrupt value stays in place until the next save.
pub fn load(storage: &mut dyn KeyValueStore, clock: &dyn Clock) -> Vec<Task> {
    let raw = match storage.get(STORAGE_KEY) {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => {
            info!("No saved tasks under '{}', seeding demo tasks.", STORAGE_KEY);
            let seed = seed_tasks(clock.now());
            if let Err(e) = save(storage, &seed) {
                warn!("Failed to save the seed tasks: {:?}", e);
            }
            return seed;
        }
        Err(e) => {
            error!("load error: {:?}", e);
            return Vec::new();
        }
    };

    match serde_json::from_slice::<Option<Vec<Task>>>(&raw) {
        Ok(tasks) => {
            let tasks = tasks.unwrap_or_default();
            debug!("Loaded {} tasks from storage.", tasks.len());
            tasks
        }
        Err(e) => {
            error!("load error: saved tasks are not valid JSON: {}", e);
            Vec::new()
        }
    }
}

/// Writes the whole task list under [`STORAGE_KEY`], overwriting the old value.
pub fn save(storage: &mut dyn KeyValueStore, tasks: &[Task]) -> Result<()> {
    let bytes = serde_json::to_vec(tasks).context("Failed to serialize tasks")?;
    storage
        .set(STORAGE_KEY, &bytes)
        .context("Failed to write tasks to storage")?;
    debug!("Saved {} tasks ({} bytes).", tasks.len(), bytes.len());
    Ok(())
}

/// The three demo tasks shown on a fresh install.
pub fn seed_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let today = now.date_naive();
    let in_days = |n: u64| today.checked_add_days(Days::new(n));

    let seed = |id: &str, title: &str, desc: &str, priority: Priority, tags: &[&str]| Task {
        id: id.to_string(),
        title: title.to_string(),
        desc: desc.to_string(),
        due: None,
        priority,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        completed: false,
        created_at: Some(now),
        extra: Map::new(),
    };

    vec![
        seed(
            "seed_1",
            "Prepare GKS documents",
            "Collect transcripts, certificates, and recommendation letters.",
            Priority::High,
            &["GKS", "Documents"],
        ),
        Task {
            due: in_days(7),
            ..seed(
                "seed_2",
                "Study Data Structures",
                "Practice arrays, linked lists and trees — 2 hours daily.",
                Priority::Medium,
                &["CS", "DS"],
            )
        },
        Task {
            due: in_days(3),
            ..seed(
                "seed_3",
                "Portfolio polish",
                "Update project descriptions and add screenshots.",
                Priority::Low,
                &["Portfolio"],
            )
        },
    ]
}

// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::Task;

/// Which tasks to keep, by completion state.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    Active,
    Completed,
    Overdue,
    #[default]
    #[serde(other)]
    All,
}

impl StatusFilter {
    pub fn keeps(self, task: &Task, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
            Self::Overdue => task.is_overdue(now),
        }
    }
}

/// How to order the filtered tasks. `None` keeps store order.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    CreatedDesc,
    DueAsc,
    PriorityDesc,
    #[default]
    #[serde(other)]
    None,
}

impl SortOrder {
    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            // Tasks without a timestamp go last.
            Self::CreatedDesc => match (a.created_at, b.created_at) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::DueAsc => match (a.due, b.due) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::PriorityDesc => b.priority.rank().cmp(&a.priority.rank()),
            Self::None => Ordering::Equal,
        }
    }
}

/// The list controls: status filter, sort order and search text.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Query {
    pub filter: StatusFilter,
    pub sort: SortOrder,
    #[serde(alias = "q")]
    pub search: String,
}

impl Query {
    /// Runs filter, then sort, then search over `tasks`.
    ///
    /// Works on a fresh vector of references; the caller's order is never
    /// changed. Sorting is stable, so ties keep their store order.
    pub fn apply<'a>(&self, tasks: &'a [Task], now: DateTime<Utc>) -> Vec<&'a Task> {
        let mut list: Vec<&Task> = tasks
            .iter()
            .filter(|task| self.filter.keeps(task, now))
            .collect();

        if self.sort != SortOrder::None {
            list.sort_by(|a, b| self.sort.compare(a, b));
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return list;
        }
        list.retain(|task| matches_text(task, &needle));
        list
    }
}

fn matches_text(task: &Task, needle: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(needle);
    hit(&task.title) || hit(&task.desc) || task.tags.iter().any(|tag| hit(tag))
}

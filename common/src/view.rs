// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{Query, Task};

/// At most this many tags are shown per task.
pub const MAX_VISIBLE_TAGS: usize = 6;

/// Display-ready form of one task.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub desc: String,
    pub tags: Vec<String>,
    pub due: Option<NaiveDate>,
    /// "Due: Mar 9", possibly followed by " • overdue", or the creation day.
    pub when: String,
    pub overdue: bool,
    pub priority: String,
    pub priority_class: String,
    pub completed: bool,
}

impl TaskView {
    pub fn new(task: &Task, now: DateTime<Utc>) -> Self {
        let overdue = task.is_overdue(now);
        let when = match task.due {
            Some(day) if overdue => format!("Due: {} • overdue", short_date(day)),
            Some(day) => format!("Due: {}", short_date(day)),
            None => task
                .created_at
                .map(|at| short_date(at.date_naive()))
                .unwrap_or_default(),
        };
        let priority_class = task.priority.as_str().to_string();

        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            desc: task.desc.clone(),
            tags: task.tags.iter().take(MAX_VISIBLE_TAGS).cloned().collect(),
            due: task.due,
            when,
            overdue,
            priority: capitalize(&priority_class),
            priority_class,
            completed: task.completed,
        }
    }
}

/// Runs `query` over `tasks` and builds the views to display, in order.
pub fn render(tasks: &[Task], query: &Query, now: DateTime<Utc>) -> Vec<TaskView> {
    query
        .apply(tasks, now)
        .into_iter()
        .map(|task| TaskView::new(task, now))
        .collect()
}

/// Share of completed tasks as a rounded percentage. An empty list is 0%.
pub fn progress(tasks: &[Task]) -> u8 {
    let total = tasks.len().max(1);
    let done = tasks.iter().filter(|t| t.completed).count();
    ((done as f64 / total as f64) * 100.0).round() as u8
}

fn short_date(day: NaiveDate) -> String {
    day.format("%b %-d").to_string()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SortOrder, StatusFilter};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn task(value: serde_json::Value) -> Task {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_view_labels() {
        let late = task(json!({
            "id": "a", "title": "A", "due": "2025-03-09", "priority": "high",
            "tags": ["1", "2", "3", "4", "5", "6", "7"]
        }));
        let view = TaskView::new(&late, now());

        assert_eq!(view.when, "Due: Mar 9 • overdue");
        assert!(view.overdue);
        assert_eq!(view.priority, "High");
        assert_eq!(view.priority_class, "high");
        assert_eq!(view.tags.len(), 6);
        assert_eq!(view.tags.last().map(String::as_str), Some("6"));
    }

    #[test]
    fn test_view_without_due_shows_creation_day() {
        let plain = task(json!({
            "id": "b", "title": "B", "priority": "someday", "createdAt": "2025-02-03T08:00:00Z"
        }));
        let view = TaskView::new(&plain, now());

        assert_eq!(view.when, "Feb 3");
        assert!(!view.overdue);
        assert_eq!(view.priority, "Someday");

        let bare = task(json!({ "id": "c" }));
        assert_eq!(TaskView::new(&bare, now()).when, "");
        assert_eq!(TaskView::new(&bare, now()).priority, "Medium");
    }

    #[test]
    fn test_render_applies_query() {
        let tasks = vec![
            task(json!({ "id": "low", "title": "Low", "priority": "low" })),
            task(json!({ "id": "done", "title": "Done", "completed": true, "priority": "high" })),
            task(json!({ "id": "high", "title": "High", "priority": "high" })),
        ];
        let query = Query {
            filter: StatusFilter::Active,
            sort: SortOrder::PriorityDesc,
            search: String::new(),
        };

        let views = render(&tasks, &query, now());

        let ids: Vec<&str> = views.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "low"]);
        assert_eq!(views[0].priority, "High");
    }

    #[test]
    fn test_render_can_be_empty() {
        let query = Query { search: "nothing matches".into(), ..Query::default() };
        assert!(render(&[], &query, now()).is_empty());
    }

    #[test]
    fn test_progress_rounds() {
        let mut tasks: Vec<Task> = (0..3).map(|i| task(json!({ "id": i.to_string() }))).collect();
        assert_eq!(progress(&tasks), 0);

        tasks[0].completed = true;
        assert_eq!(progress(&tasks), 33);

        tasks[1].completed = true;
        assert_eq!(progress(&tasks), 67);

        tasks[2].completed = true;
        assert_eq!(progress(&tasks), 100);
        assert_eq!(progress(&[]), 0);
    }
}

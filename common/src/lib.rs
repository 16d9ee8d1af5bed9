// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
pub mod clock;
pub mod query;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod view;

pub use clock::{Clock, FixedClock, SystemClock};
pub use query::{Query, SortOrder, StatusFilter};
pub use storage::{KeyValueStore, MemoryStore, STORAGE_KEY};
pub use store::TaskStore;
pub use transfer::{EXPORT_FILE_NAME, ImportError};
pub use view::{TaskView, progress, render};

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Map, Value};

const DAY_FORMAT: &str = "%Y-%m-%d";

// Keys written from typed fields; everything else in `extra` is copied as is.
const TASK_KEYS: [&str; 8] = [
    "id",
    "title",
    "desc",
    "due",
    "priority",
    "tags",
    "completed",
    "createdAt",
];

/// A single study task.
///
/// Reading a task never fails. Missing fields take their defaults, text
/// fields holding other JSON are stringified, and a value that does not fit
/// its field (a due date that is not a day, a timestamp that is not RFC 3339)
/// leaves the field at its default while the raw value stays in `extra`.
/// Raw values and unknown keys are written back unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub desc: String,
    // Only the calendar day matters, there is no time of day or timezone.
    pub due: Option<NaiveDate>,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub completed: bool,
    // Always set by the store; imported records may lack it.
    pub created_at: Option<DateTime<Utc>>,
    pub extra: Map<String, Value>,
}

impl Task {
    /// Builds a task from any JSON value. Non-objects give an empty task.
    pub fn from_json(value: Value) -> Self {
        let Value::Object(mut extra) = value else {
            return Self::default();
        };

        let id = text_field(extra.remove("id"));
        let title = text_field(extra.remove("title"));
        let desc = text_field(extra.remove("desc"));
        let due: Option<NaiveDate> = lenient(&mut extra, "due", |raw| match raw {
            Value::Null => Some(None),
            Value::String(text) if text.trim().is_empty() => Some(None),
            Value::String(text) => parse_day(text).map(Some),
            _ => None,
        });
        let priority: Priority = lenient(&mut extra, "priority", |raw| match raw {
            Value::Null => Some(Priority::default()),
            Value::String(text) => text.parse::<Priority>().ok(),
            _ => None,
        });
        let tags: Vec<String> = lenient(&mut extra, "tags", |raw| match raw {
            Value::Null => Some(Vec::new()),
            Value::Array(items) => Some(items.iter().map(text_of).collect()),
            _ => None,
        });
        let completed: bool = lenient(&mut extra, "completed", |raw| match raw {
            Value::Null => Some(false),
            Value::Bool(done) => Some(*done),
            _ => None,
        });
        let created_at: Option<DateTime<Utc>> =
            lenient(&mut extra, "createdAt", |raw| match raw {
                Value::Null => Some(None),
                Value::String(text) => DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|at| Some(at.with_timezone(&Utc))),
                _ => None,
            });

        Self {
            id,
            title,
            desc,
            due,
            priority,
            tags,
            completed,
            created_at,
            extra,
        }
    }

    /// True when the task is not done and its due day ended before `now`.
    ///
    /// The day ends at 23:59:59 UTC.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        match self.due.and_then(|day| day.and_hms_opt(23, 59, 59)) {
            Some(end_of_day) => end_of_day.and_utc() < now,
            None => false,
        }
    }

    /// Drops the raw value kept for `key`, once the typed field was set.
    pub(crate) fn clear_raw(&mut self, key: &str) {
        self.extra.remove(key);
    }

    // A raw value kept from reading wins over the typed field.
    fn write_field<M, T>(
        &self,
        map: &mut M,
        key: &str,
        value: Option<&T>,
    ) -> Result<(), M::Error>
    where
        M: SerializeMap,
        T: Serialize + ?Sized,
    {
        match (self.extra.get(key), value) {
            (Some(raw), _) => map.serialize_entry(key, raw),
            (None, Some(value)) => map.serialize_entry(key, value),
            (None, None) => Ok(()),
        }
    }
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

impl Serialize for Task {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let due = self
            .due
            .map(|day| day.format(DAY_FORMAT).to_string())
            .unwrap_or_default();

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("title", &self.title)?;
        map.serialize_entry("desc", &self.desc)?;
        self.write_field(&mut map, "due", Some(&due))?;
        self.write_field(&mut map, "priority", Some(&self.priority))?;
        self.write_field(&mut map, "tags", Some(&self.tags))?;
        self.write_field(&mut map, "completed", Some(&self.completed))?;
        self.write_field(&mut map, "createdAt", self.created_at.as_ref())?;
        for (key, value) in &self.extra {
            if !TASK_KEYS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn text_field(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    }
}

/// Removes `key` from `fields` and converts it with `read`. A value `read`
/// rejects goes back into `fields` and the field takes its default.
fn lenient<T: Default>(
    fields: &mut Map<String, Value>,
    key: &str,
    read: impl FnOnce(&Value) -> Option<T>,
) -> T {
    let Some(raw) = fields.remove(key) else {
        return T::default();
    };
    match read(&raw) {
        Some(value) => value,
        None => {
            fields.insert(key.to_string(), raw);
            T::default()
        }
    }
}

fn parse_day(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DAY_FORMAT).ok()
}

/// Task priority. Values other than `low`, `medium` and `high` are kept
/// verbatim and rank like `medium`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Other(raw) => raw,
        }
    }

    /// Sort weight: high 3, medium 2, low 1, anything else 2.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Low => 1,
            Self::Medium | Self::Other(_) => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            other => Self::Other(other.to_string()),
        })
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw {
            Some(text) => text.parse().unwrap_or_default(),
            None => Self::default(),
        })
    }
}

/// Field values supplied when creating a task.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TaskFields {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, deserialize_with = "due_input")]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "tag_input")]
    pub tags: Vec<String>,
}

/// Partial update for an existing task. Absent fields are left alone.
/// `due: Some(None)` clears the due date.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "patch_due")]
    pub due: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "patch_tags")]
    pub tags: Option<Vec<String>>,
}

/// Splits a comma-separated tag line, trimming each entry and dropping the
/// empty ones.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

// Tags arrive either as a JSON list or as the raw text of a form field.
#[derive(Deserialize)]
#[serde(untagged)]
enum TagInput {
    List(Vec<String>),
    Text(String),
}

impl TagInput {
    fn into_tags(self) -> Vec<String> {
        match self {
            Self::Text(text) => parse_tags(&text),
            Self::List(list) => list
                .iter()
                .map(|tag| tag.trim())
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

fn tag_input<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let input = Option::<TagInput>::deserialize(deserializer)?;
    Ok(input.map(TagInput::into_tags).unwrap_or_default())
}

fn patch_tags<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    tag_input(deserializer).map(Some)
}

fn patch_due<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<NaiveDate>>, D::Error> {
    due_input(deserializer).map(Some)
}

// `YYYY-MM-DD`, with `""` or `null` standing for "no due date".
fn due_input<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, DAY_FORMAT)
            .map(Some)
            .map_err(de::Error::custom),
    }
}

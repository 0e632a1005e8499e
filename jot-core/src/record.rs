//! Stored task records: a parsed task plus identity and completion state.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{normalize, Candidate};
use crate::task::{Category, ParsedTask, Priority};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: u64,
    #[serde(flatten)]
    pub task: ParsedTask,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    pub fn from_parsed(id: u64, task: ParsedTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            task,
            completed: false,
            created_at: now,
            completed_at: None,
        }
    }

    pub fn mark_done(&mut self, now: DateTime<Utc>) {
        if !self.completed {
            self.completed = true;
            self.completed_at = Some(now);
        }
    }

    pub fn reopen(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    /// Pending and past its due date.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.task.due_date.is_some_and(|d| d < now)
    }

    /// Apply an edit. The result is re-normalized so edits cannot break the
    /// task invariants (blank title, stray sigils on tags, ...).
    pub fn apply(&mut self, patch: TaskPatch) {
        let mut c = Candidate::from(&self.task);
        if let Some(title) = patch.title {
            c.title = Value::from(title);
        }
        if let Some(description) = patch.description {
            c.description = description.map_or(Value::Null, Value::from);
        }
        if let Some(priority) = patch.priority {
            c.priority = Value::from(priority.as_str());
        }
        if let Some(category) = patch.category {
            c.category = Value::from(category.as_str());
        }
        if let Some(due) = patch.due_date {
            c.due_date = due.map_or(Value::Null, |d| Value::from(d.to_rfc3339()));
        }
        if let Some(tags) = patch.tags {
            c.tags = Value::from(tags);
        }
        // every timestamp in `c` carries an offset, so the zone is irrelevant
        self.task = normalize(&c, &Tz::UTC);
    }
}

/// Field replacements for an existing record. `None` leaves a field alone;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> TaskRecord {
        let task = ParsedTask {
            title: "Finish report".to_string(),
            description: Some("Q3".to_string()),
            priority: Priority::High,
            category: Category::Work,
            due_date: Some(Utc.with_ymd_and_hms(2025, 6, 25, 17, 0, 0).unwrap()),
            tags: vec!["work".to_string()],
        };
        TaskRecord::from_parsed(1, task, Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn done_and_reopen() {
        let mut r = record();
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        r.mark_done(now);
        assert!(r.completed);
        assert_eq!(r.completed_at, Some(now));

        // completing twice keeps the first timestamp
        r.mark_done(now + chrono::Duration::hours(1));
        assert_eq!(r.completed_at, Some(now));

        r.reopen();
        assert!(!r.completed);
        assert!(r.completed_at.is_none());
    }

    #[test]
    fn overdue_only_when_pending_and_past_due() {
        let mut r = record();
        let later = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
        assert!(r.is_overdue(later));
        assert!(!r.is_overdue(earlier));
        r.mark_done(later);
        assert!(!r.is_overdue(later));
    }

    #[test]
    fn patch_keeps_invariants() {
        let mut r = record();
        r.apply(TaskPatch {
            title: Some("   ".to_string()),
            description: Some(None),
            due_date: Some(None),
            tags: Some(vec!["#home".to_string(), " ".to_string()]),
            ..TaskPatch::default()
        });
        assert_eq!(r.task.title, "Untitled Task");
        assert!(r.task.description.is_none());
        assert!(r.task.due_date.is_none());
        assert_eq!(r.task.tags, vec!["home"]);
        assert_eq!(r.task.priority, Priority::High);
        assert_eq!(r.task.category, Category::Work);
    }

    #[test]
    fn patch_replaces_fields() {
        let mut r = record();
        let due = Utc.with_ymd_and_hms(2025, 7, 4, 12, 0, 0).unwrap();
        r.apply(TaskPatch {
            priority: Some(Priority::Low),
            category: Some(Category::Personal),
            due_date: Some(Some(due)),
            ..TaskPatch::default()
        });
        assert_eq!(r.task.priority, Priority::Low);
        assert_eq!(r.task.category, Category::Personal);
        assert_eq!(r.task.due_date, Some(due));
        assert_eq!(r.task.title, "Finish report");
        assert!(TaskPatch::default().is_empty());
    }

    #[test]
    fn record_json_is_flat() {
        let r = record();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["title"], "Finish report");
        assert_eq!(v["dueDate"], "2025-06-25T17:00:00Z");
        let back: TaskRecord = serde_json::from_value(v).unwrap();
        assert_eq!(back, r);
    }
}

//! List views over stored records: filtering and sorting.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::record::TaskRecord;
use crate::task::{Category, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Pending,
    Done,
    All,
}

impl FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "open" | "todo" => Ok(Self::Pending),
            "done" | "completed" => Ok(Self::Done),
            "all" => Ok(Self::All),
            other => anyhow::bail!("unknown status: {other} (expected pending, done, all)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Soonest first; undated tasks last.
    #[default]
    Due,
    /// Urgent first.
    Priority,
    /// Oldest first.
    Created,
    Title,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "due" => Ok(Self::Due),
            "priority" => Ok(Self::Priority),
            "created" => Ok(Self::Created),
            "title" => Ok(Self::Title),
            other => {
                anyhow::bail!("unknown sort key: {other} (expected due, priority, created, title)")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: StatusFilter,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub tag: Option<String>,
    pub overdue: bool,
    pub due_before: Option<DateTime<Utc>>,
    pub sort: SortKey,
    pub reverse: bool,
}

impl TaskQuery {
    pub fn matches(&self, r: &TaskRecord, now: DateTime<Utc>) -> bool {
        let status_ok = match self.status {
            StatusFilter::Pending => !r.completed,
            StatusFilter::Done => r.completed,
            StatusFilter::All => true,
        };
        if !status_ok {
            return false;
        }
        if self.priority.is_some_and(|p| p != r.task.priority) {
            return false;
        }
        if self.category.is_some_and(|c| c != r.task.category) {
            return false;
        }
        if let Some(tag) = &self.tag {
            let tag = tag.trim_start_matches(['#', '@']);
            if !r.task.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                return false;
            }
        }
        if self.overdue && !r.is_overdue(now) {
            return false;
        }
        if let Some(before) = self.due_before {
            if !r.task.due_date.is_some_and(|d| d < before) {
                return false;
            }
        }
        true
    }

    /// Filter then sort. Ties are broken by id so output is stable.
    pub fn run<'a>(&self, records: &'a [TaskRecord], now: DateTime<Utc>) -> Vec<&'a TaskRecord> {
        let mut out: Vec<&TaskRecord> = records.iter().filter(|r| self.matches(r, now)).collect();
        out.sort_by(|a, b| {
            let ord = self.compare(a, b);
            let ord = if self.reverse { ord.reverse() } else { ord };
            ord.then(a.id.cmp(&b.id))
        });
        out
    }

    fn compare(&self, a: &TaskRecord, b: &TaskRecord) -> Ordering {
        match self.sort {
            SortKey::Due => match (a.task.due_date, b.task.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortKey::Priority => a.task.priority.rank().cmp(&b.task.priority.rank()),
            SortKey::Created => a.created_at.cmp(&b.created_at),
            SortKey::Title => a.task.title.to_lowercase().cmp(&b.task.title.to_lowercase()),
        }
    }
}

//! Candidate coercion: the single place where task invariants are enforced.
//!
//! Both strategies hand back a loosely typed [`Candidate`]; [`normalize`]
//! turns it into a [`ParsedTask`] whose fields are always in-domain.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::collapse_whitespace;
use crate::task::{ParsedTask, UNTITLED};
use crate::time::parse_iso_instant;

/// Raw, untrusted field values as produced by a strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub priority: Value,
    #[serde(default)]
    pub category: Value,
    #[serde(default, alias = "due_date")]
    pub due_date: Value,
    #[serde(default)]
    pub tags: Value,
}

impl Candidate {
    /// Read a candidate out of a JSON value. Only objects qualify.
    pub fn from_json(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }
}

impl From<&ParsedTask> for Candidate {
    fn from(task: &ParsedTask) -> Self {
        Self {
            title: Value::from(task.title.clone()),
            description: task.description.clone().map_or(Value::Null, Value::from),
            priority: Value::from(task.priority.as_str()),
            category: Value::from(task.category.as_str()),
            due_date: task.due_date.map_or(Value::Null, |d| Value::from(d.to_rfc3339())),
            tags: Value::from(task.tags.clone()),
        }
    }
}

/// Coerce a candidate into a valid task.
///
/// Naive timestamps are read as wall-clock time in `tz`.
pub fn normalize(candidate: &Candidate, tz: &Tz) -> ParsedTask {
    let title = collapse_whitespace(&scalar_text(&candidate.title));

    ParsedTask {
        title: if title.is_empty() { UNTITLED.to_string() } else { title },
        description: candidate
            .description
            .as_str()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        priority: candidate
            .priority
            .as_str()
            .and_then(|p| p.parse().ok())
            .unwrap_or_default(),
        category: candidate
            .category
            .as_str()
            .and_then(|c| c.parse().ok())
            .unwrap_or_default(),
        due_date: candidate
            .due_date
            .as_str()
            .and_then(|d| parse_iso_instant(d, tz)),
        tags: normalize_tags(&candidate.tags),
    }
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn normalize_tags(v: &Value) -> Vec<String> {
    let Some(items) = v.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(|t| t.trim().trim_start_matches(['#', '@']).trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

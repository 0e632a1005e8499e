//! Human-readable output. Dates are shown in the configured zone.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use jot_core::time::format_local;
use jot_core::{ParsedTask, TaskRecord};

fn due_text(task: &ParsedTask, tz: &Tz) -> String {
    task.due_date
        .map(|d| format_local(d, tz))
        .unwrap_or_else(|| "-".to_string())
}

fn tags_text(tags: &[String]) -> String {
    tags.iter().map(|t| format!("#{t}")).collect::<Vec<_>>().join(" ")
}

pub fn task_details(task: &ParsedTask, tz: &Tz) -> String {
    let mut out = String::new();
    out.push_str(&format!("title:       {}\n", task.title));
    if let Some(d) = &task.description {
        out.push_str(&format!("description: {d}\n"));
    }
    out.push_str(&format!("priority:    {}\n", task.priority));
    out.push_str(&format!("category:    {}\n", task.category));
    out.push_str(&format!("due:         {}\n", due_text(task, tz)));
    out.push_str(&format!("tags:        {}\n", tags_text(&task.tags)));
    out
}

/// One line per record, as printed by `jot list`.
pub fn record_line(r: &TaskRecord, tz: &Tz, now: DateTime<Utc>) -> String {
    let mark = if r.completed { "x" } else { " " };
    let mut line = format!(
        "{:>4} [{mark}] {:<8} {:<9} {:<16} {}",
        r.id,
        r.task.priority.as_str(),
        r.task.category.as_str(),
        due_text(&r.task, tz),
        r.task.title
    );
    if !r.task.tags.is_empty() {
        line.push_str("  ");
        line.push_str(&tags_text(&r.task.tags));
    }
    if r.is_overdue(now) {
        line.push_str("  (overdue)");
    }
    line
}

pub fn record_details(r: &TaskRecord, tz: &Tz) -> String {
    let mut out = format!("id:          {}\n", r.id);
    out.push_str(&task_details(&r.task, tz));
    out.push_str(&format!(
        "status:      {}\n",
        if r.completed { "done" } else { "pending" }
    ));
    out.push_str(&format!("created:     {}\n", format_local(r.created_at, tz)));
    if let Some(at) = r.completed_at {
        out.push_str(&format!("completed:   {}\n", format_local(at, tz)));
    }
    out
}

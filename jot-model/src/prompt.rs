//! System instruction for the model-assisted parser.

use chrono::{DateTime, Datelike};
use chrono_tz::Tz;

/// Build the system prompt for a request made at `now` (user's local time).
///
/// The prompt pins the output schema, the date rules the rule-based parser
/// also follows, and a few worked examples dated in the current year.
pub fn build_system_prompt(now: DateTime<Tz>) -> String {
    let iso = now.to_rfc3339();
    let year = now.year();
    let weekday = now.format("%A");

    format!(
        r#"You turn one line of free-form text into a task record.

Current date and time: {iso} ({weekday}). Current year: {year}.

Reply with exactly one JSON object and nothing else, using these fields:
{{
  "title": string, the task itself without dates, times, priority words, #tags or @mentions,
  "description": string or null, only when the text has a "notes:", "details:" or "description:" part,
  "priority": "low" | "medium" | "high" | "urgent",
  "category": "work" | "personal" | "health" | "learning" | "other",
  "dueDate": ISO-8601 local date-time "YYYY-MM-DDTHH:MM:SS" or null,
  "tags": array of strings from #hashtags and @mentions, without the # or @
}}

Rules:
- priority: urgent for urgent/asap/critical/emergency/now; high for important/soon/quickly or anything due today; low for "low priority", "when possible", "eventually", "sometime"; otherwise medium.
- dueDate: resolve relative dates ("tomorrow", "next week", "friday", "in 3 days") against the current date above.
- A date without a year is in {year}; if that moment has already passed, use the next year.
- A date without a time of day is due at 17:00.
- No date or time in the text means "dueDate": null.
- Keep tags in the order they appear, hashtags first, then mentions.

Examples:
Input: Finish report by 25th June #q2
Output: {{"title":"Finish report","description":null,"priority":"medium","category":"work","dueDate":"{year}-06-25T17:00:00","tags":["q2"]}}

Input: urgent call dentist about the filling @drlee
Output: {{"title":"call dentist about the filling","description":null,"priority":"urgent","category":"health","dueDate":null,"tags":["drlee"]}}

Input: Read chapter 4 sometime notes: focus on the proofs
Output: {{"title":"Read chapter 4","description":"focus on the proofs","priority":"low","category":"learning","dueDate":null,"tags":[]}}"#
    )
}

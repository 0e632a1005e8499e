//! Rule-based field extractors.
//!
//! Each extractor is a pure `&str -> value` function so they can be composed by
//! the rule-based strategy and tested on their own. None of them fail: an
//! unrecognized input yields the field default.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::due::{is_quantity, MONTH_PATTERN};
use crate::task::{Category, Priority, UNTITLED};

const URGENT_WORDS: &[&str] = &["urgent", "asap", "critical", "emergency", "now"];
const HIGH_WORDS: &[&str] = &["important", "high priority", "soon", "quickly"];
const LOW_WORDS: &[&str] = &["low priority", "when possible", "eventually", "sometime"];
const IMMEDIATE_WORDS: &[&str] = &["today", "now", "this morning", "this afternoon"];

const WORK_KEYWORDS: &[&str] = &[
    "work", "meeting", "project", "report", "client", "office", "email", "presentation",
    "deadline", "boss", "colleague", "invoice", "standup",
];
const PERSONAL_KEYWORDS: &[&str] = &[
    "family", "friend", "mom", "dad", "birthday", "groceries", "grocery", "shopping",
    "clean", "laundry", "party", "gift", "dinner", "house",
];
const HEALTH_KEYWORDS: &[&str] = &[
    "doctor", "dentist", "gym", "exercise", "workout", "medicine", "pharmacy", "health",
    "yoga", "therapy", "checkup",
];
const LEARNING_KEYWORDS: &[&str] = &[
    "learn", "study", "course", "reading", "book", "class", "lecture", "tutorial",
    "homework", "practice", "exam",
];

/// Whole-word (or whole-phrase) alternation over `words`, case-insensitive.
pub(crate) fn word_set(words: &[&str]) -> Regex {
    let alt = words
        .iter()
        .map(|w| regex::escape(w).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alt})\b")).expect("keyword regex")
}

static URGENT_RE: LazyLock<Regex> = LazyLock::new(|| word_set(URGENT_WORDS));
static HIGH_RE: LazyLock<Regex> = LazyLock::new(|| word_set(HIGH_WORDS));
static LOW_RE: LazyLock<Regex> = LazyLock::new(|| word_set(LOW_WORDS));
static IMMEDIATE_RE: LazyLock<Regex> = LazyLock::new(|| word_set(IMMEDIATE_WORDS));

static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\b(?:notes|details|description)\s*:\s*(.*)$").expect("description regex")
});

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("hashtag regex"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("mention regex"));

const DATE_PREFIX: &str = r"(?:(?:by|on|before|after|until|due)\s+)?";

/// Phrases removed from the title, applied in order.
static TITLE_NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let patterns = [
        // clock times
        r"(?i)\b(?:(?:by|at|on|before|after|until)\s+)?\d{1,2}(?::\d{2})?\s*(?:am|pm)\b".to_string(),
        // 25th June, 3rd of march
        format!(
            r"(?i)\b{DATE_PREFIX}(?:the\s+)?\d{{1,2}}(?:st|nd|rd|th)\s+(?:of\s+)?{MONTH_PATTERN}\b"
        ),
        // June 25, Jun 3rd
        format!(r"(?i)\b{DATE_PREFIX}{MONTH_PATTERN}\s+\d{{1,2}}(?:st|nd|rd|th)?\b"),
        // relative days
        format!(
            r"(?i)\b{DATE_PREFIX}(?:today|tonight|tomorrow|tmrw|tmr|this\s+morning|this\s+afternoon|this\s+evening|this\s+week|next\s+week|end\s+of\s+(?:the\s+)?week|in\s+\d+\s+days?)\b"
        ),
        // weekdays
        r"(?i)\b(?:(?:by|on|before|after|until|due|next|this)\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b".to_string(),
        // priority keywords
        r"(?i)\b(?:high\s+priority|low\s+priority|urgent|asap|critical|important)\b".to_string(),
        // tags and mentions
        r"[#@]\w+".to_string(),
    ];
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("title noise regex"))
        .collect()
});

/// 25/06, 6.25.2026; applied with a guard so `2.5 kg` stays in the title.
static NUMERIC_DATE_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{DATE_PREFIX}\d{{1,2}}[/.\-]\d{{1,2}}(?:[/.\-](?P<year>\d{{4}}))?\b"
    ))
    .expect("numeric date noise regex")
});

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title: the input minus dates, times, priority words, tags and the
/// description tail.
pub fn extract_title(raw: &str) -> String {
    let head = match DESCRIPTION_RE.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    };

    let mut s = head.to_string();
    for re in TITLE_NOISE.iter() {
        s = re.replace_all(&s, " ").into_owned();
    }
    let cleaned = NUMERIC_DATE_NOISE
        .replace_all(&s, |caps: &Captures<'_>| {
            if is_quantity(&s, caps) {
                caps[0].to_string()
            } else {
                " ".to_string()
            }
        })
        .into_owned();

    let title = collapse_whitespace(&cleaned);
    let title =
        title.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'));
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

/// Description: the text after a `notes:`, `details:` or `description:` marker.
pub fn extract_description(raw: &str) -> Option<String> {
    let caps = DESCRIPTION_RE.captures(raw)?;
    let body = collapse_whitespace(caps.get(1)?.as_str());
    if body.is_empty() { None } else { Some(body) }
}

/// Priority by keyword class: urgent > high > low, then immediacy words
/// imply high, otherwise medium.
pub fn extract_priority(text: &str) -> Priority {
    if URGENT_RE.is_match(text) {
        Priority::Urgent
    } else if HIGH_RE.is_match(text) {
        Priority::High
    } else if LOW_RE.is_match(text) {
        Priority::Low
    } else if IMMEDIATE_RE.is_match(text) {
        Priority::High
    } else {
        Priority::Medium
    }
}

/// Category by keyword containment; the first set that matches wins.
pub fn extract_category(text: &str) -> Category {
    let lower = text.to_lowercase();
    let sets: [(Category, &[&str]); 4] = [
        (Category::Work, WORK_KEYWORDS),
        (Category::Personal, PERSONAL_KEYWORDS),
        (Category::Health, HEALTH_KEYWORDS),
        (Category::Learning, LEARNING_KEYWORDS),
    ];

    sets.into_iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(c, _)| c)
        .unwrap_or(Category::Other)
}

/// Tags: every `#hashtag` in input order, then every `@mention`.
/// Duplicates are kept.
pub fn extract_tags(raw: &str) -> Vec<String> {
    let hashtags = HASHTAG_RE.captures_iter(raw).map(|c| c[1].to_string());
    let mentions = MENTION_RE.captures_iter(raw).map(|c| c[1].to_string());
    hashtags.chain(mentions).collect()
}

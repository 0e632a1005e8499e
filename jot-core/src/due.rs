//! Rule-based due-date extraction.
//!
//! A due date is resolved in two independent parts:
//!
//! 1. the time of day (`3pm`, `9:30 am`), defaulting to 17:00;
//! 2. the calendar date, found by walking [`DUE_RULES`] in order. The first
//!    rule that resolves wins and later rules are never consulted.
//!
//! All arithmetic happens on local wall-clock values; converting to an
//! absolute instant is the normalizer's job.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::extract::word_set;

/// Month names, full or abbreviated. Non-capturing.
pub(crate) const MONTH_PATTERN: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

/// Which reading of an ambiguous numeric date like `5/6` is tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayMonthOrder {
    /// 5/6 is the 5th of June.
    #[default]
    DayFirst,
    /// 5/6 is May 6th.
    MonthFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueOptions {
    /// Applied when the text names a day but no time.
    pub default_time: NaiveTime,
    pub day_month_order: DayMonthOrder,
}

impl Default for DueOptions {
    fn default() -> Self {
        Self {
            default_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            day_month_order: DayMonthOrder::DayFirst,
        }
    }
}

/// Everything a rule may look at.
#[derive(Debug, Clone)]
pub struct DueInput<'a> {
    pub raw: &'a str,
    pub lower: String,
    pub now: NaiveDateTime,
    /// Time of day the resolved date will carry.
    pub time: NaiveTime,
    pub day_month_order: DayMonthOrder,
}

impl<'a> DueInput<'a> {
    pub fn new(raw: &'a str, now: NaiveDateTime, options: &DueOptions) -> Self {
        Self {
            raw,
            lower: raw.to_lowercase(),
            now,
            time: extract_time(raw).unwrap_or(options.default_time),
            day_month_order: options.day_month_order,
        }
    }

    fn today(&self) -> NaiveDate {
        self.now.date()
    }
}

/// A named `(matcher, resolver)` pair.
pub struct DueRule {
    pub name: &'static str,
    pub resolve: fn(&DueInput<'_>) -> Option<NaiveDate>,
}

/// Rules in precedence order.
pub const DUE_RULES: &[DueRule] = &[
    DueRule { name: "day-month", resolve: resolve_day_month },
    DueRule { name: "month-day", resolve: resolve_month_day },
    DueRule { name: "numeric", resolve: resolve_numeric },
    DueRule { name: "today", resolve: resolve_today },
    DueRule { name: "tomorrow", resolve: resolve_tomorrow },
    DueRule { name: "this-week", resolve: resolve_this_week },
    DueRule { name: "next-week", resolve: resolve_next_week },
    DueRule { name: "weekday", resolve: resolve_weekday },
    DueRule { name: "in-days", resolve: resolve_in_days },
];

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").expect("time regex")
});

static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<day>\d{{1,2}})(?:st|nd|rd|th)\s+(?:of\s+)?(?P<month>{MONTH_PATTERN})\b"
    ))
    .expect("day-month regex")
});

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<month>{MONTH_PATTERN})\s+(?P<day>\d{{1,2}})(?:st|nd|rd|th)?\b"
    ))
    .expect("month-day regex")
});

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<a>\d{1,2})[/.\-](?P<b>\d{1,2})(?:[/.\-](?P<year>\d{4}))?\b")
        .expect("numeric date regex")
});

// a unit right after `2.5` makes it an amount
static UNIT_AFTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:%|(?:kg|g|mg|lbs?|oz|km|m|cm|mm|mi|l|ml|hrs?|hours?|mins?|minutes?|x|times|percent|pcs|cups?|tbsp|tsp)\b)",
    )
    .expect("unit regex")
});

static TODAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&["today", "this morning", "this afternoon", "this evening", "tonight"])
});
static TOMORROW_RE: LazyLock<Regex> = LazyLock::new(|| word_set(&["tomorrow", "tmrw", "tmr"]));
static THIS_WEEK_RE: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&["this week", "by friday", "end of week", "end of the week"])
});
static NEXT_WEEK_RE: LazyLock<Regex> = LazyLock::new(|| word_set(&["next week"]));
static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(sunday|monday|tuesday|wednesday|thursday|friday|saturday)\b")
        .expect("weekday regex")
});
static IN_DAYS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bin\s+(\d{1,5})\s+days?\b").expect("in-days regex"));

/// Time of day from a `H[:MM] am|pm` expression, as a 24-hour time.
pub fn extract_time(raw: &str) -> Option<NaiveTime> {
    TIME_RE.captures_iter(raw).find_map(|caps| {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps[3].eq_ignore_ascii_case("pm");
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        NaiveTime::from_hms_opt(hour, minute, 0)
    })
}

/// Resolve the due date of `raw` relative to `now`.
pub fn extract_due(raw: &str, now: NaiveDateTime, options: &DueOptions) -> Option<NaiveDateTime> {
    resolve_due(raw, now, options).map(|(_, due)| due)
}

/// Like [`extract_due`], also naming the rule that matched.
pub fn resolve_due(
    raw: &str,
    now: NaiveDateTime,
    options: &DueOptions,
) -> Option<(&'static str, NaiveDateTime)> {
    let input = DueInput::new(raw, now, options);
    DUE_RULES.iter().find_map(|rule| {
        (rule.resolve)(&input).map(|date| (rule.name, date.and_time(input.time)))
    })
}

fn month_from_name(name: &str) -> Option<u32> {
    let key = name.get(..3)?.to_lowercase();
    let m = match key.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(m)
}

/// Current-year date, pushed to next year when it has already passed.
fn this_or_next_year(input: &DueInput<'_>, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1..=31).contains(&day) {
        return None;
    }
    let year = input.now.year();
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    if date.and_time(input.time) < input.now {
        NaiveDate::from_ymd_opt(year + 1, month, day)
    } else {
        Some(date)
    }
}

/// `25th June`, `3rd of march`
pub fn resolve_day_month(input: &DueInput<'_>) -> Option<NaiveDate> {
    let caps = DAY_MONTH_RE.captures(input.raw)?;
    let day: u32 = caps["day"].parse().ok()?;
    let month = month_from_name(&caps["month"])?;
    this_or_next_year(input, month, day)
}

/// `June 25`, `Jan 3rd`
pub fn resolve_month_day(input: &DueInput<'_>) -> Option<NaiveDate> {
    let caps = MONTH_DAY_RE.captures(input.raw)?;
    let day: u32 = caps["day"].parse().ok()?;
    let month = month_from_name(&caps["month"])?;
    this_or_next_year(input, month, day)
}

/// True when a numeric date match is really an amount such as `2.5 kg`:
/// dot-separated, no year, and followed by a unit. `caps` must come from a
/// search over `haystack` and may carry a `year` group.
pub(crate) fn is_quantity(haystack: &str, caps: &Captures<'_>) -> bool {
    let Some(whole) = caps.get(0) else {
        return false;
    };
    caps.name("year").is_none()
        && whole.as_str().contains('.')
        && UNIT_AFTER_RE.is_match(&haystack[whole.end()..])
}

/// `25/06`, `6-25`, `25.06.2026`
pub fn resolve_numeric(input: &DueInput<'_>) -> Option<NaiveDate> {
    let caps = NUMERIC_RE
        .captures_iter(input.raw)
        .find(|c| !is_quantity(input.raw, c))?;
    let a: u32 = caps["a"].parse().ok()?;
    let b: u32 = caps["b"].parse().ok()?;
    let year = match caps.name("year") {
        Some(y) => y.as_str().parse().ok()?,
        None => input.now.year(),
    };

    // (month, day) readings, preferred one first
    let readings = match input.day_month_order {
        DayMonthOrder::DayFirst => [(b, a), (a, b)],
        DayMonthOrder::MonthFirst => [(a, b), (b, a)],
    };
    let (month, day, date) = readings
        .into_iter()
        .find_map(|(m, d)| NaiveDate::from_ymd_opt(year, m, d).map(|date| (m, d, date)))?;

    if year == input.now.year() && date.and_time(input.time) < input.now {
        NaiveDate::from_ymd_opt(year + 1, month, day)
    } else {
        Some(date)
    }
}

pub fn resolve_today(input: &DueInput<'_>) -> Option<NaiveDate> {
    TODAY_RE.is_match(&input.lower).then(|| input.today())
}

pub fn resolve_tomorrow(input: &DueInput<'_>) -> Option<NaiveDate> {
    if !TOMORROW_RE.is_match(&input.lower) {
        return None;
    }
    input.today().checked_add_days(Days::new(1))
}

/// Days until `target` (0 = Sunday), always in 1..=7.
fn days_until(today: NaiveDate, target: u32) -> u64 {
    let current = today.weekday().num_days_from_sunday() as i64;
    let mut offset = target as i64 - current;
    if offset <= 0 {
        offset += 7;
    }
    offset as u64
}

/// The coming Friday; a week out when today is Friday or Saturday.
pub fn resolve_this_week(input: &DueInput<'_>) -> Option<NaiveDate> {
    if !THIS_WEEK_RE.is_match(&input.lower) {
        return None;
    }
    let today = input.today();
    today.checked_add_days(Days::new(days_until(today, 5)))
}

pub fn resolve_next_week(input: &DueInput<'_>) -> Option<NaiveDate> {
    if !NEXT_WEEK_RE.is_match(&input.lower) {
        return None;
    }
    input.today().checked_add_days(Days::new(7))
}

/// Next occurrence of a named weekday, strictly after today.
pub fn resolve_weekday(input: &DueInput<'_>) -> Option<NaiveDate> {
    let caps = WEEKDAY_RE.captures(&input.lower)?;
    let target = match &caps[1] {
        "sunday" => 0,
        "monday" => 1,
        "tuesday" => 2,
        "wednesday" => 3,
        "thursday" => 4,
        "friday" => 5,
        _ => 6,
    };
    let today = input.today();
    today.checked_add_days(Days::new(days_until(today, target)))
}

pub fn resolve_in_days(input: &DueInput<'_>) -> Option<NaiveDate> {
    let caps = IN_DAYS_RE.captures(&input.lower)?;
    let n: u64 = caps[1].parse().ok()?;
    input.today().checked_add_days(Days::new(n))
}

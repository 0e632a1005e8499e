//! Parser facade: an ordered fallback chain of candidate sources.
//!
//! The primary source (typically model-assisted) is tried first. Any error it
//! returns sends the input to the rule-based parser, which cannot fail. Either
//! way the candidate goes through [`normalize`], so `parse` is total.

use anyhow::Result;
use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use tracing::{debug, warn};

use crate::due::{resolve_due, DayMonthOrder, DueOptions};
use crate::extract::{
    extract_category, extract_description, extract_priority, extract_tags, extract_title,
};
use crate::normalize::{normalize, Candidate};
use crate::task::ParsedTask;
use crate::time::local_to_utc;

/// Something that can turn raw text into an unvalidated candidate.
pub trait CandidateSource: Send + Sync {
    fn name(&self) -> &str;

    /// `now` is the current wall-clock time in the user's timezone.
    fn propose(&self, input: &str, now: DateTime<Tz>) -> Result<Candidate>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    pub timezone: Tz,
    pub day_month_order: DayMonthOrder,
    pub default_due_time: NaiveTime,
}

impl Default for ParserOptions {
    fn default() -> Self {
        let due = DueOptions::default();
        Self {
            timezone: Tz::UTC,
            day_month_order: due.day_month_order,
            default_due_time: due.default_time,
        }
    }
}

impl ParserOptions {
    pub fn due_options(&self) -> DueOptions {
        DueOptions {
            default_time: self.default_due_time,
            day_month_order: self.day_month_order,
        }
    }
}

/// Deterministic keyword/regex extraction.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedParser {
    due: DueOptions,
}

impl RuleBasedParser {
    pub fn new(due: DueOptions) -> Self {
        Self { due }
    }

    pub fn candidate(&self, input: &str, now: DateTime<Tz>) -> Candidate {
        let due = resolve_due(input, now.naive_local(), &self.due).map(|(rule, due)| {
            debug!(rule, due = %due, "due date rule matched");
            Value::from(due.format("%Y-%m-%dT%H:%M:%S").to_string())
        });

        Candidate {
            title: Value::from(extract_title(input)),
            description: extract_description(input).map_or(Value::Null, Value::from),
            priority: Value::from(extract_priority(input).as_str()),
            category: Value::from(extract_category(input).as_str()),
            due_date: due.unwrap_or(Value::Null),
            tags: Value::from(extract_tags(input)),
        }
    }
}

impl CandidateSource for RuleBasedParser {
    fn name(&self) -> &str {
        "rules"
    }

    fn propose(&self, input: &str, now: DateTime<Tz>) -> Result<Candidate> {
        Ok(self.candidate(input, now))
    }
}

pub struct TaskParser {
    options: ParserOptions,
    primary: Option<Box<dyn CandidateSource>>,
    rules: RuleBasedParser,
}

impl TaskParser {
    /// A parser that only uses the rule-based strategy.
    pub fn rule_based(options: ParserOptions) -> Self {
        Self {
            options,
            primary: None,
            rules: RuleBasedParser::new(options.due_options()),
        }
    }

    /// Try `source` before the rules.
    pub fn with_primary(mut self, source: Box<dyn CandidateSource>) -> Self {
        self.primary = Some(source);
        self
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn parse(&self, input: &str) -> ParsedTask {
        self.parse_at(input, Utc::now())
    }

    pub fn parse_at(&self, input: &str, now: DateTime<Utc>) -> ParsedTask {
        let tz = self.options.timezone;
        let local_now = now.with_timezone(&tz);

        let candidate = match &self.primary {
            Some(source) => match source.propose(input, local_now) {
                Ok(c) => {
                    debug!(source = source.name(), "primary source produced a candidate");
                    c
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "primary source failed; using rules");
                    self.rules.candidate(input, local_now)
                }
            },
            None => {
                debug!("no primary source configured; using rules");
                self.rules.candidate(input, local_now)
            }
        };

        normalize(&candidate, &tz)
    }

    /// Resolve a free-form date phrase ("friday 3pm", "25/12") with the
    /// due-date rules only.
    pub fn resolve_due_at(&self, text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let tz = self.options.timezone;
        let local_now = now.with_timezone(&tz).naive_local();
        let (_, due) = resolve_due(text, local_now, &self.options.due_options())?;
        local_to_utc(due, &tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Category, Priority};
    use chrono::TimeZone;

    struct Failing;

    impl CandidateSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn propose(&self, _input: &str, _now: DateTime<Tz>) -> Result<Candidate> {
            anyhow::bail!("service unavailable")
        }
    }

    struct Fixed(Candidate);

    impl CandidateSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn propose(&self, _input: &str, _now: DateTime<Tz>) -> Result<Candidate> {
            Ok(self.0.clone())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn rules_only_parser() {
        let p = TaskParser::rule_based(ParserOptions::default());
        let t = p.parse_at("Meeting tomorrow at 3:30 PM", now());
        assert_eq!(t.title, "Meeting");
        assert_eq!(t.category, Category::Work);
        assert_eq!(t.due_date.unwrap(), Utc.with_ymd_and_hms(2025, 6, 2, 15, 30, 0).unwrap());
    }

    #[test]
    fn failing_primary_falls_back_to_rules() {
        let p = TaskParser::rule_based(ParserOptions::default()).with_primary(Box::new(Failing));
        let t = p.parse_at("urgent but low priority task", now());
        assert_eq!(t.priority, Priority::Urgent);
    }

    #[test]
    fn primary_candidate_is_normalized() {
        let c = Candidate {
            title: Value::from("  from model "),
            priority: Value::from("banana"),
            ..Candidate::default()
        };
        let source = Fixed(c);
        let p = TaskParser::rule_based(ParserOptions::default()).with_primary(Box::new(source));
        let t = p.parse_at("whatever urgent", now());
        assert_eq!(t.title, "from model");
        assert_eq!(t.priority, Priority::Medium);
    }

    #[test]
    fn rule_dates_are_local_to_timezone() {
        let options = ParserOptions {
            timezone: "Asia/Tokyo".parse().unwrap(),
            ..ParserOptions::default()
        };
        let p = TaskParser::rule_based(options);
        // 2025-06-01 09:00 UTC is 18:00 in Tokyo; 5pm tomorrow local is 08:00 UTC on the 2nd
        let t = p.parse_at("pay bill tomorrow", now());
        assert_eq!(t.due_date.unwrap(), Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap());
    }

    #[test]
    fn spring_forward_time_is_kept() {
        let options = ParserOptions {
            timezone: chrono_tz::America::Chicago,
            ..ParserOptions::default()
        };
        let p = TaskParser::rule_based(options);
        // clocks jump from 02:00 to 03:00 on 2026-03-08; 2:30am lands at 03:30 CDT
        let now = Utc.with_ymd_and_hms(2026, 3, 7, 18, 0, 0).unwrap();
        let t = p.parse_at("Call mom tomorrow at 2:30am", now);
        assert_eq!(t.title, "Call mom");
        assert_eq!(t.due_date, Some(Utc.with_ymd_and_hms(2026, 3, 8, 8, 30, 0).unwrap()));
    }

    #[test]
    fn resolve_due_phrase() {
        let p = TaskParser::rule_based(ParserOptions::default());
        assert_eq!(
            p.resolve_due_at("friday 9am", now()),
            Some(Utc.with_ymd_and_hms(2025, 6, 6, 9, 0, 0).unwrap())
        );
        assert_eq!(p.resolve_due_at("whenever", now()), None);
    }
}

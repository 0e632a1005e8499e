use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use jot_core::{
    normalize, Candidate, CandidateSource, Category, ParsedTask, ParserOptions, Priority,
    RuleBasedParser, TaskParser, DUE_RULES,
};
use serde_json::json;

fn parser() -> TaskParser {
    TaskParser::rule_based(ParserOptions::default())
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn assert_valid(t: &ParsedTask) {
    assert!(!t.title.trim().is_empty());
    assert_eq!(t.title, t.title.split_whitespace().collect::<Vec<_>>().join(" "));
    assert!(t.description.as_ref().is_none_or(|d| !d.trim().is_empty()));
    assert!(t.tags.iter().all(|tag| !tag.is_empty()));
}

/// Every input, however odd, yields a valid task.
#[test]
fn test_parse_is_total() {
    let p = parser();
    let now = utc(2025, 6, 1, 9, 0);
    for input in [
        "",
        "   ",
        "\n\t",
        "???",
        "#",
        "@",
        "notes:",
        "99/99/9999",
        "31st February",
        "in 99999 days",
        "🦀🦀🦀 tomorrow",
        "at 99:99 pm",
        "ñandú por la mañana",
    ] {
        let t = p.parse_at(input, now);
        assert_valid(&t);
    }

    let t = p.parse_at("", now);
    assert_eq!(t, ParsedTask::default());
}

#[test]
fn test_ordinal_date_scenario() {
    let t = parser().parse_at("Finish report by 25th June", utc(2025, 1, 10, 9, 0));
    assert_eq!(t.title, "Finish report");
    assert_eq!(t.due_date, Some(utc(2025, 6, 25, 17, 0)));
    assert_eq!(t.priority, Priority::Medium);
    assert_eq!(t.category, Category::Work);
    assert!(t.tags.is_empty());
}

#[test]
fn test_rollover_scenario() {
    let t = parser().parse_at("Submit taxes 5th January", utc(2025, 12, 20, 9, 0));
    assert_eq!(t.title, "Submit taxes");
    assert_eq!(t.due_date, Some(utc(2026, 1, 5, 17, 0)));
}

#[test]
fn test_time_override_scenario() {
    let t = parser().parse_at("Meeting tomorrow at 3:30 PM", utc(2025, 6, 1, 9, 0));
    assert_eq!(t.due_date, Some(utc(2025, 6, 2, 15, 30)));
}

#[test]
fn test_priority_precedence_scenario() {
    let t = parser().parse_at("urgent but low priority task", utc(2025, 6, 1, 9, 0));
    assert_eq!(t.priority, Priority::Urgent);
}

#[test]
fn test_tag_scenario() {
    let t = parser().parse_at("Call client #work @bob about #work", utc(2025, 6, 1, 9, 0));
    assert_eq!(t.tags, vec!["work", "bob", "work"]);
    assert_eq!(t.title, "Call client about");
}

#[test]
fn test_description_scenario() {
    let t = parser().parse_at(
        "Prepare slides for Friday details: use the new template",
        utc(2025, 6, 1, 9, 0),
    );
    assert_eq!(t.title, "Prepare slides for");
    assert_eq!(t.description.as_deref(), Some("use the new template"));
    assert_eq!(t.due_date, Some(utc(2025, 6, 6, 17, 0)));
}

#[test]
fn test_local_timezone_due_dates() {
    let tz: Tz = "America/Chicago".parse().unwrap();
    let p = TaskParser::rule_based(ParserOptions {
        timezone: tz,
        ..ParserOptions::default()
    });
    let t = p.parse_at("Finish report by 25th June", utc(2025, 1, 10, 15, 0));
    let local = t.due_local(&tz).unwrap();
    assert_eq!(local.date(), NaiveDate::from_ymd_opt(2025, 6, 25).unwrap());
    assert_eq!(local.format("%H:%M").to_string(), "17:00");
    // CDT is UTC-5
    assert_eq!(t.due_date, Some(utc(2025, 6, 25, 22, 0)));
}

#[test]
fn test_default_substitution() {
    let c =
        Candidate::from_json(json!({"title": "x", "priority": "banana", "category": 42})).unwrap();
    let t = normalize(&c, &Tz::UTC);
    assert_eq!(t.priority, Priority::Medium);
    assert_eq!(t.category, Category::Other);
}

#[test]
fn test_normalize_idempotent_on_rule_output() {
    let rules = RuleBasedParser::default();
    let now = Tz::UTC.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    for input in [
        "Finish report by 25th June #q2",
        "gym monday 7am @coach",
        "study chapter 3 eventually notes: skim the summary",
        "",
    ] {
        let c = rules.propose(input, now).unwrap();
        let once = normalize(&c, &Tz::UTC);
        let twice = normalize(&Candidate::from(&once), &Tz::UTC);
        assert_eq!(once, twice, "not idempotent for {input:?}");
    }
}

#[test]
fn test_rule_order_is_fixed() {
    let names: Vec<&str> = DUE_RULES.iter().map(|r| r.name).collect();
    assert_eq!(
        names,
        vec![
            "day-month",
            "month-day",
            "numeric",
            "today",
            "tomorrow",
            "this-week",
            "next-week",
            "weekday",
            "in-days"
        ]
    );
}

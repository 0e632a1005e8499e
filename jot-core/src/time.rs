//! Time utilities: timezone-aware conversion between wall-clock and UTC instants.

use anyhow::Result;
use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

/// Parse an IANA timezone name like "America/Chicago".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Parse a wall-clock time like "17:00".
pub fn parse_clock(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| anyhow::anyhow!("invalid time of day '{s}' (expected HH:MM): {e}"))
}

/// Resolve a local wall-clock time in `tz` to UTC.
///
/// Ambiguous times (DST fall-back) take the earlier instant. A time inside a
/// DST gap is read with the offset in force before the gap, which moves it
/// forward by the gap length (02:30 on a spring-forward night becomes 03:30).
pub fn local_to_utc(local: NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => {
            let before = local.checked_sub_signed(Duration::hours(24))?;
            let offset = tz.offset_from_local_datetime(&before).earliest()?.fix();
            offset
                .from_local_datetime(&local)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with an offset, naive date-times (read as wall-clock time
/// in `tz`) and bare dates (local midnight). Anything else, including
/// calendar-invalid values such as `2025-13-40`, is `None`.
pub fn parse_iso_instant(s: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return local_to_utc(ndt, tz);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| local_to_utc(d.and_time(NaiveTime::MIN), tz))
}

/// Format a UTC instant as local "YYYY-MM-DD HH:MM" for display.
pub fn format_local(dt: DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string()
}

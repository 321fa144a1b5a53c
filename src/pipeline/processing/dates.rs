use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Calendar components of a timestamp, all `None` when it could not be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarParts {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl CalendarParts {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.day.is_none()
    }
}

impl<Tz: chrono::TimeZone> From<&DateTime<Tz>> for CalendarParts {
    fn from(dt: &DateTime<Tz>) -> Self {
        Self {
            year: Some(dt.year()),
            month: Some(dt.month()),
            day: Some(dt.day()),
        }
    }
}

/// Parse a Graph timestamp such as `2025-11-07T15:47:37Z`.
///
/// The trailing `Z` is read as `+00:00`; explicit offsets and offset-less
/// timestamps are accepted too. Parts come from the wall-clock date as
/// written, no zone conversion is applied.
pub fn parse_timestamp(timestamp: &str) -> Option<DateTime<FixedOffset>> {
    let ts = timestamp.trim();
    if ts.is_empty() {
        return None;
    }

    let normalized = match ts.strip_suffix('Z').or_else(|| ts.strip_suffix('z')) {
        Some(rest) => format!("{}+00:00", rest),
        None => ts.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt);
    }

    // Offset-less forms are taken as UTC
    let utc = FixedOffset::east_opt(0)?;
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(ts, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .and_then(|naive| naive.and_local_timezone(utc).single())
}

pub fn parse_calendar(timestamp: Option<&str>) -> CalendarParts {
    timestamp
        .and_then(parse_timestamp)
        .map(|dt| CalendarParts::from(&dt))
        .unwrap_or_default()
}

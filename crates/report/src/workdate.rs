//! Work date resolution
//!
//! Report exports carry a `DocumentDate` (ISO datetime or bare date) and
//! an optional IANA `Timezone`. Datetimes without an offset are treated
//! as UTC and converted to the report timezone before the weekday and
//! display date are derived, so a report filed late in the evening lands
//! on the right calendar day.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde_json::Value;

/// Default report timezone when the export does not carry one
const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// Resolved work date with its original raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDate {
    date: Option<NaiveDate>,
    raw: String,
}

impl WorkDate {
    /// Resolve the work date from a report's `DocumentDate` and `Timezone`
    pub fn from_report(data: &Value) -> Self {
        let raw = data
            .get("DocumentDate")
            .and_then(|d| d.as_str())
            .unwrap_or("")
            .to_string();
        let timezone = data
            .get("Timezone")
            .and_then(|t| t.as_str())
            .unwrap_or(DEFAULT_TIMEZONE);

        Self::parse(&raw, timezone)
    }

    /// Parse a date string, converting datetimes into the given timezone
    pub fn parse(raw: &str, timezone: &str) -> Self {
        let date = if raw.contains('T') {
            parse_datetime(raw).map(|utc| match timezone.parse::<Tz>() {
                Ok(tz) => utc.with_timezone(&tz).date_naive(),
                Err(_) => utc.date_naive(),
            })
        } else {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
        };

        Self {
            date,
            raw: raw.to_string(),
        }
    }

    /// Weekday name, defaulting to Monday when the date is unknown
    pub fn weekday_name(&self) -> &'static str {
        let weekday = self.date.map(|d| d.weekday()).unwrap_or(Weekday::Mon);
        match weekday {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    /// Radio appearance name for the weekday group, "1" through "7"
    pub fn weekday_appearance(&self) -> &'static str {
        let weekday = self.date.map(|d| d.weekday()).unwrap_or(Weekday::Mon);
        match weekday {
            Weekday::Mon => "1",
            Weekday::Tue => "2",
            Weekday::Wed => "3",
            Weekday::Thu => "4",
            Weekday::Fri => "5",
            Weekday::Sat => "6",
            Weekday::Sun => "7",
        }
    }

    /// Date formatted as `MM/DD/YY`, or the raw text when unparseable
    pub fn display(&self) -> String {
        match self.date {
            Some(date) => date.format("%m/%d/%y").to_string(),
            None => self.raw.clone(),
        }
    }
}

/// Parse an ISO datetime, treating a missing offset as UTC
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = raw.replace('Z', "+00:00");

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

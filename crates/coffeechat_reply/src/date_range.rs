// --- File: crates/coffeechat_reply/src/date_range.rs ---
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use coffeechat_gcal::logic::start_of_day;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Named date ranges offered by the front end.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeKind {
    ThisWeek,
    NextWeek,
    #[default]
    TwoWeeks,
}

impl DateRangeKind {
    /// Unknown names fall back to two weeks.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "this_week" => DateRangeKind::ThisWeek,
            "next_week" => DateRangeKind::NextWeek,
            "two_weeks" => DateRangeKind::TwoWeeks,
            other => {
                debug!("Unknown date range '{}', using two_weeks", other);
                DateRangeKind::TwoWeeks
            }
        }
    }

    /// First day and the day after the last day, relative to `today`.
    pub fn days(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let tomorrow = today + Duration::days(1);
        match self {
            DateRangeKind::ThisWeek => {
                let to_sunday = 6 - i64::from(today.weekday().num_days_from_monday());
                (tomorrow, today + Duration::days(to_sunday + 1))
            }
            DateRangeKind::NextWeek => {
                let monday = next_monday(today);
                (monday, monday + Duration::days(7))
            }
            DateRangeKind::TwoWeeks => (tomorrow, today + Duration::days(15)),
        }
    }
}

/// Monday of next week. On a Monday this is a week away.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let days = 7 - i64::from(today.weekday().num_days_from_monday());
    today + Duration::days(days)
}

/// A half-open range of whole days in the reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub first_day: NaiveDate,
    pub end_day: NaiveDate,
}

impl DateRange {
    /// Uses `custom` when both dates parse as YYYY-MM-DD and are in order, `kind` otherwise.
    pub fn resolve(kind: DateRangeKind, custom: Option<(&str, &str)>, today: NaiveDate) -> Self {
        if let Some((start, end)) = custom {
            match (parse_day(start), parse_day(end)) {
                (Some(first_day), Some(end_day)) if first_day < end_day => {
                    return Self { first_day, end_day };
                }
                _ => warn!(
                    "Ignoring unusable custom range {} .. {}, using {:?}",
                    start, end, kind
                ),
            }
        }
        let (first_day, end_day) = kind.days(today);
        Self { first_day, end_day }
    }

    pub fn is_empty(&self) -> bool {
        self.first_day >= self.end_day
    }

    /// UTC instants of local midnight at both ends.
    pub fn to_utc(&self, time_zone: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((
            start_of_day(self.first_day, time_zone)?,
            start_of_day(self.end_day, time_zone)?,
        ))
    }
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

// --- File: crates/coffeechat_gcal/src/logic.rs ---
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use coffeechat_common::error::{service_disabled, validation_error, CoffeechatError};
use coffeechat_common::services::{BoxedError, CalendarProvider};
use coffeechat_config::SchedulingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// --- Error Handling ---
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AvailabilityError {
    #[error("range start {start} must be before range end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("minimum duration must be positive, got {0} minutes")]
    NonPositiveDuration(i64),
    #[error("duration of {0} minutes is out of range")]
    DurationOutOfRange(i64),
    #[error("date range spans {days} days, at most {max} are supported")]
    RangeTooLong { days: i64, max: i64 },
    #[error("working window start {start} must be before end {end}")]
    InvalidWorkingHours { start: NaiveTime, end: NaiveTime },
    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTimeOfDay(String),
    #[error("unknown weekday '{0}'")]
    InvalidWeekday(String),
    #[error("unknown time zone '{0}'")]
    InvalidTimeZone(String),
}

/// Errors of the availability lookup as seen by callers of [`find_free_slots`].
#[derive(Error, Debug)]
pub enum GcalError {
    #[error(transparent)]
    Availability(#[from] AvailabilityError),
    #[error("Invalid {field} '{value}', expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },
    #[error("Google Calendar is not connected")]
    NotConnected,
    #[error("Calendar provider error: {0}")]
    Provider(#[from] BoxedError),
}

impl From<GcalError> for CoffeechatError {
    fn from(err: GcalError) -> Self {
        match err {
            GcalError::Availability(e) => validation_error(e),
            GcalError::InvalidDate { .. } => validation_error(err),
            GcalError::NotConnected => service_disabled(
                "Calendar not connected. Check that GCAL_CREDENTIALS is set correctly.",
            ),
            GcalError::Provider(e) => CoffeechatError::ExternalServiceError {
                service_name: "Google Calendar".to_string(),
                message: e.to_string(),
            },
        }
    }
}

// --- Data Structures ---

/// A half-open span `[start, end)` of UTC instants with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A free range that fits in one working window and is at least the requested duration.
pub type FreeSlot = TimeInterval;

impl TimeInterval {
    /// Returns `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Overlap of two intervals, if non-empty.
    pub fn intersect(&self, other: &TimeInterval) -> Option<TimeInterval> {
        TimeInterval::new(self.start.max(other.start), self.end.min(other.end))
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Daily working window in a reference timezone, applied on the listed weekdays.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingHoursPolicy {
    pub time_zone: Tz,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub working_days: Vec<Weekday>,
}

impl WorkingHoursPolicy {
    pub fn new(
        time_zone: Tz,
        start: NaiveTime,
        end: NaiveTime,
        working_days: Vec<Weekday>,
    ) -> Result<Self, AvailabilityError> {
        if start >= end {
            return Err(AvailabilityError::InvalidWorkingHours { start, end });
        }
        Ok(Self {
            time_zone,
            start,
            end,
            working_days,
        })
    }

    /// Same window on all seven days.
    pub fn every_day(time_zone: Tz, start: NaiveTime, end: NaiveTime) -> Result<Self, AvailabilityError> {
        Self::new(time_zone, start, end, ALL_WEEKDAYS.to_vec())
    }

    /// The window on a local calendar date, or `None` on a non-working day.
    pub fn window_for(&self, date: NaiveDate) -> Option<TimeInterval> {
        if !self.working_days.contains(&date.weekday()) {
            return None;
        }
        let start = local_to_utc(&self.time_zone, date.and_time(self.start))?;
        let end = local_to_utc(&self.time_zone, date.and_time(self.end))?;
        TimeInterval::new(start, end)
    }

    /// Working windows touching `[range_start, range_end)`, clipped to it, in order.
    pub fn windows_in(&self, range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> Vec<TimeInterval> {
        let Some(range) = TimeInterval::new(range_start, range_end) else {
            return Vec::new();
        };
        let first = range_start.with_timezone(&self.time_zone).date_naive();
        let last = range_end.with_timezone(&self.time_zone).date_naive();

        first
            .iter_days()
            .take_while(|date| *date <= last)
            .filter_map(|date| self.window_for(date))
            .filter_map(|window| window.intersect(&range))
            .collect()
    }
}

/// Padding kept free on both sides of every busy interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPolicy {
    pub buffer: Duration,
}

impl BufferPolicy {
    pub fn minutes(minutes: i64) -> Self {
        Self {
            buffer: Duration::minutes(minutes.max(0)),
        }
    }

    pub fn none() -> Self {
        Self::minutes(0)
    }

    pub fn apply(&self, interval: &TimeInterval) -> TimeInterval {
        TimeInterval {
            start: interval.start - self.buffer,
            end: interval.end + self.buffer,
        }
    }
}

pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// --- Availability Logic ---

/// Computes the free ranges inside the working windows of `[range_start, range_end)`.
///
/// Busy intervals may be unsorted, overlapping or span several days. Each is widened by the
/// buffer, then overlapping or touching intervals are merged, and every working window is
/// walked left to right emitting the gaps of at least `min_duration`. Windows are never joined
/// across days. Busy intervals with `start >= end` are logged and skipped.
pub fn compute_free_slots(
    busy: &[(DateTime<Utc>, DateTime<Utc>)],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    working_hours: &WorkingHoursPolicy,
    buffer: &BufferPolicy,
    min_duration: Duration,
) -> Result<Vec<FreeSlot>, AvailabilityError> {
    validate_request(range_start, range_end, min_duration)?;

    let buffered: Vec<TimeInterval> = busy
        .iter()
        .filter_map(|&(start, end)| match TimeInterval::new(start, end) {
            Some(interval) => Some(buffer.apply(&interval)),
            None => {
                warn!("Discarding malformed busy interval {} - {}", start, end);
                None
            }
        })
        .collect();
    let merged = merge_intervals(buffered);

    let windows = working_hours.windows_in(range_start, range_end);
    debug!(
        "Computing free slots over {} windows with {} merged busy intervals",
        windows.len(),
        merged.len()
    );

    let mut slots = Vec::new();
    for window in windows {
        let mut cursor = window.start;
        // Busy intervals ending at or before the window start cannot affect it.
        let first = merged.partition_point(|busy| busy.end <= window.start);
        for busy in merged[first..].iter().take_while(|busy| busy.start < window.end) {
            if busy.start > cursor {
                push_if_long_enough(&mut slots, cursor, busy.start, min_duration);
            }
            cursor = cursor.max(busy.end);
            if cursor >= window.end {
                break;
            }
        }
        push_if_long_enough(&mut slots, cursor, window.end, min_duration);
    }
    Ok(slots)
}

fn validate_request(
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    min_duration: Duration,
) -> Result<(), AvailabilityError> {
    if range_start >= range_end {
        return Err(AvailabilityError::InvalidRange {
            start: range_start,
            end: range_end,
        });
    }
    if min_duration <= Duration::zero() {
        return Err(AvailabilityError::NonPositiveDuration(min_duration.num_minutes()));
    }
    Ok(())
}

fn push_if_long_enough(
    slots: &mut Vec<FreeSlot>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_duration: Duration,
) {
    if let Some(slot) = TimeInterval::new(start, end) {
        if slot.duration() >= min_duration {
            slots.push(slot);
        }
    }
}

/// Sorts by start and merges intervals that overlap or touch.
pub fn merge_intervals(mut intervals: Vec<TimeInterval>) -> Vec<TimeInterval> {
    intervals.sort();
    let mut merged: Vec<TimeInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Intersects each slot with the working windows of `policy`, dropping pieces shorter than
/// `min_duration`.
pub fn restrict_to_window(
    slots: &[FreeSlot],
    policy: &WorkingHoursPolicy,
    min_duration: Duration,
) -> Vec<FreeSlot> {
    slots
        .iter()
        .flat_map(|slot| policy.windows_in(slot.start, slot.end))
        .filter(|piece| piece.duration() >= min_duration)
        .collect()
}

/// Shrinks every slot onto the wall-clock grid of `increment` in `time_zone`: the start is
/// rounded up and the end rounded down. Slots shorter than `min_duration` afterwards are dropped.
pub fn snap_to_increment(
    slots: &[FreeSlot],
    time_zone: &Tz,
    increment: Duration,
    min_duration: Duration,
) -> Vec<FreeSlot> {
    let step = increment.num_seconds();
    if step <= 0 {
        return slots.to_vec();
    }
    slots
        .iter()
        .filter_map(|slot| {
            let start = round_to_grid(slot.start, time_zone, step, true);
            let end = round_to_grid(slot.end, time_zone, step, false);
            TimeInterval::new(start, end)
        })
        .filter(|slot| slot.duration() >= min_duration)
        .collect()
}

fn round_to_grid(instant: DateTime<Utc>, time_zone: &Tz, step_secs: i64, up: bool) -> DateTime<Utc> {
    let offset = i64::from(instant.with_timezone(time_zone).offset().fix().local_minus_utc());
    let secs = instant.timestamp();
    let remainder = (secs + offset).rem_euclid(step_secs);
    let on_grid = remainder == 0 && instant.timestamp_subsec_nanos() == 0;
    let rounded = match (on_grid, up) {
        (true, _) => return instant,
        (false, true) => secs - remainder + step_secs,
        (false, false) => secs - remainder,
    };
    DateTime::from_timestamp(rounded, 0).unwrap_or(instant)
}

/// Resolves a local wall-clock time; times inside a DST gap move forward by an hour.
fn local_to_utc(time_zone: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    time_zone
        .from_local_datetime(&local)
        .earliest()
        .or_else(|| time_zone.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

// --- Scheduling Policy ---

/// Recipient timezones the reply assistant can propose times in.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetTimezone {
    #[serde(rename = "ET")]
    Eastern,
    #[serde(rename = "CST")]
    Central,
    #[serde(rename = "PST")]
    Pacific,
}

impl TargetTimezone {
    pub fn tz(&self) -> Tz {
        match self {
            TargetTimezone::Eastern => chrono_tz::America::New_York,
            TargetTimezone::Central => chrono_tz::America::Chicago,
            TargetTimezone::Pacific => chrono_tz::America::Los_Angeles,
        }
    }

    /// Short code as sent by the front end.
    pub fn code(&self) -> &'static str {
        match self {
            TargetTimezone::Eastern => "ET",
            TargetTimezone::Central => "CST",
            TargetTimezone::Pacific => "PST",
        }
    }

    /// Label printed after times rendered in this zone.
    pub fn label(&self) -> &'static str {
        match self {
            TargetTimezone::Eastern => "EST",
            TargetTimezone::Central => "CST",
            TargetTimezone::Pacific => "PST",
        }
    }
}

impl FromStr for TargetTimezone {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ET" | "EST" | "EDT" | "EASTERN" | "AMERICA/NEW_YORK" => Ok(TargetTimezone::Eastern),
            "CT" | "CST" | "CDT" | "CENTRAL" | "AMERICA/CHICAGO" => Ok(TargetTimezone::Central),
            "PT" | "PST" | "PDT" | "PACIFIC" | "AMERICA/LOS_ANGELES" => Ok(TargetTimezone::Pacific),
            _ => Err(AvailabilityError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for TargetTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Host working hours plus the rules applied on top of [`compute_free_slots`] when
/// proposing times to a recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingPolicy {
    pub working_hours: WorkingHoursPolicy,
    pub buffer: BufferPolicy,
    pub slot_increment: Duration,
    pub local_start: NaiveTime,
    pub local_end: NaiveTime,
    pub lead_time: Duration,
    pub max_days: usize,
    pub reference_label: String,
}

impl SchedulingPolicy {
    pub fn from_config(config: &SchedulingConfig) -> Result<Self, AvailabilityError> {
        let time_zone = Tz::from_str(&config.time_zone)
            .map_err(|_| AvailabilityError::InvalidTimeZone(config.time_zone.clone()))?;
        let working_days = config
            .working_days
            .iter()
            .map(|day| parse_weekday(day))
            .collect::<Result<Vec<_>, _>>()?;
        let working_hours = WorkingHoursPolicy::new(
            time_zone,
            parse_time_of_day(&config.work_start_time)?,
            parse_time_of_day(&config.work_end_time)?,
            working_days,
        )?;
        let local_start = parse_time_of_day(&config.local_work_start_time)?;
        let local_end = parse_time_of_day(&config.local_work_end_time)?;
        if local_start >= local_end {
            return Err(AvailabilityError::InvalidWorkingHours {
                start: local_start,
                end: local_end,
            });
        }

        Ok(Self {
            working_hours,
            buffer: BufferPolicy::minutes(config.buffer_minutes),
            slot_increment: Duration::minutes(config.slot_increment_minutes.max(0)),
            local_start,
            local_end,
            lead_time: Duration::minutes(config.lead_time_minutes.max(0)),
            max_days: config.max_days,
            reference_label: config.reference_label.clone(),
        })
    }

    pub fn reference_tz(&self) -> Tz {
        self.working_hours.time_zone
    }

    /// Free slots for a meeting of `min_duration`, as offered to a recipient in `target`.
    ///
    /// Nothing before `now + lead_time` is offered. When the recipient lives in another
    /// timezone, slots are also limited to the recipient's local working window. Results are
    /// aligned to the slot increment in the reference timezone.
    pub fn availability(
        &self,
        busy: &[(DateTime<Utc>, DateTime<Utc>)],
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        min_duration: Duration,
        target: TargetTimezone,
        now: DateTime<Utc>,
    ) -> Result<Vec<FreeSlot>, AvailabilityError> {
        validate_request(range_start, range_end, min_duration)?;

        let effective_start = range_start.max(now + self.lead_time);
        if effective_start >= range_end {
            debug!("Requested range ends before {}, no availability", effective_start);
            return Ok(Vec::new());
        }

        let mut slots = compute_free_slots(
            busy,
            effective_start,
            range_end,
            &self.working_hours,
            &self.buffer,
            min_duration,
        )?;

        let target_tz = target.tz();
        if target_tz != self.reference_tz() {
            let local = WorkingHoursPolicy::every_day(target_tz, self.local_start, self.local_end)?;
            slots = restrict_to_window(&slots, &local, min_duration);
        }

        Ok(snap_to_increment(
            &slots,
            &self.reference_tz(),
            self.slot_increment,
            min_duration,
        ))
    }
}

/// Longest range a single lookup may cover.
pub const MAX_RANGE_DAYS: i64 = 31;

/// Converts a requested meeting length into a [`Duration`].
pub fn meeting_duration(minutes: i64) -> Result<Duration, AvailabilityError> {
    if minutes <= 0 {
        return Err(AvailabilityError::NonPositiveDuration(minutes));
    }
    Duration::try_minutes(minutes).ok_or(AvailabilityError::DurationOutOfRange(minutes))
}

/// Fetches busy intervals and applies `policy` for a meeting of `min_duration`.
///
/// Busy time is requested for the range widened by the buffer on both sides, so events just
/// outside the range still block the edges of the first and last window.
#[allow(clippy::too_many_arguments)]
pub async fn find_free_slots(
    provider: &dyn CalendarProvider<Error = BoxedError>,
    calendar_id: &str,
    policy: &SchedulingPolicy,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    min_duration: Duration,
    target: TargetTimezone,
    now: DateTime<Utc>,
) -> Result<Vec<FreeSlot>, GcalError> {
    validate_request(range_start, range_end, min_duration)?;
    let days = (range_end - range_start).num_days();
    if days > MAX_RANGE_DAYS {
        return Err(AvailabilityError::RangeTooLong {
            days,
            max: MAX_RANGE_DAYS,
        }
        .into());
    }

    let (Some(fetch_start), Some(fetch_end)) = (
        range_start.checked_sub_signed(policy.buffer.buffer),
        range_end.checked_add_signed(policy.buffer.buffer),
    ) else {
        return Err(AvailabilityError::InvalidRange {
            start: range_start,
            end: range_end,
        }
        .into());
    };
    let busy = provider
        .list_busy_intervals(calendar_id, fetch_start, fetch_end)
        .await?;
    debug!(
        "Calendar {} has {} busy intervals between {} and {}",
        calendar_id,
        busy.len(),
        fetch_start,
        fetch_end
    );

    Ok(policy.availability(&busy, range_start, range_end, min_duration, target, now)?)
}

/// Local midnight of `date` in `time_zone`.
pub fn start_of_day(date: NaiveDate, time_zone: &Tz) -> Option<DateTime<Utc>> {
    local_to_utc(time_zone, date.and_hms_opt(0, 0, 0)?)
}

/// Parses "HH:MM" (or "HH:MM:SS").
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, AvailabilityError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AvailabilityError::InvalidTimeOfDay(value.to_string()))
}

/// Parses "Mon", "monday", "TUE", ...
pub fn parse_weekday(value: &str) -> Result<Weekday, AvailabilityError> {
    Weekday::from_str(value.trim()).map_err(|_| AvailabilityError::InvalidWeekday(value.to_string()))
}

// --- HTTP Data Structures ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// First day, YYYY-MM-DD, in the reference timezone
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-03-03"))]
    pub start_date: String,

    /// Day after the last day, YYYY-MM-DD (exclusive)
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-03-08"))]
    pub end_date: String,

    /// Minimum meeting length in minutes
    #[cfg_attr(feature = "openapi", schema(example = 30))]
    pub duration_minutes: i64,

    /// Recipient timezone (ET, CST or PST), defaults to ET
    #[cfg_attr(feature = "openapi", schema(example = "ET"))]
    pub timezone: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FreeSlotDto {
    #[cfg_attr(feature = "openapi", schema(example = "2025-03-04T10:00:00-05:00"))]
    pub start_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "2025-03-04T12:30:00-05:00"))]
    pub end_time: String,
    #[cfg_attr(feature = "openapi", schema(example = 150))]
    pub duration_minutes: i64,
}

impl FreeSlotDto {
    pub fn from_slot(slot: &FreeSlot, time_zone: &Tz) -> Self {
        Self {
            start_time: slot.start.with_timezone(time_zone).to_rfc3339(),
            end_time: slot.end.with_timezone(time_zone).to_rfc3339(),
            duration_minutes: slot.duration().num_minutes(),
        }
    }
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AvailabilityResponse {
    pub slots: Vec<FreeSlotDto>,
    pub timezone: TargetTimezone,
}

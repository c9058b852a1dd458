// --- File: crates/coffeechat_reply/src/format.rs ---
use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use coffeechat_gcal::{FreeSlot, SchedulingPolicy, TargetTimezone};
use serde::Serialize;

/// One proposed day, ready for the email and the UI.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedBlock {
    /// "Tuesday, March 04 from 10:00 AM to 12:30 PM, 2:30 PM to 6:00 PM EST"
    pub local: String,
    /// Same ranges in the reference timezone
    pub est: String,
    /// Start of the day's first range, RFC 3339 in the reference timezone
    pub start_iso: String,
}

/// Free ranges falling on one day in the recipient's timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub ranges: Vec<FreeSlot>,
}

impl DayAvailability {
    pub fn free_time(&self) -> Duration {
        self.ranges
            .iter()
            .fold(Duration::zero(), |total, range| total + range.duration())
    }
}

/// Groups sorted slots by their start date in `time_zone`.
pub fn group_by_day(slots: &[FreeSlot], time_zone: &Tz) -> Vec<DayAvailability> {
    let mut days: Vec<DayAvailability> = Vec::new();
    for slot in slots {
        let date = slot.start.with_timezone(time_zone).date_naive();
        match days.last_mut() {
            Some(day) if day.date == date => day.ranges.push(*slot),
            _ => days.push(DayAvailability {
                date,
                ranges: vec![*slot],
            }),
        }
    }
    days
}

/// Keeps the `max_days` days with the most free time, in chronological order.
///
/// Ties go to the earlier day. A limit of zero keeps every day.
pub fn select_best_days(mut days: Vec<DayAvailability>, max_days: usize) -> Vec<DayAvailability> {
    if max_days == 0 || days.len() <= max_days {
        return days;
    }
    days.sort_by(|a, b| b.free_time().cmp(&a.free_time()).then(a.date.cmp(&b.date)));
    days.truncate(max_days);
    days.sort_by_key(|day| day.date);
    days
}

fn clock(time: DateTime<Tz>) -> String {
    time.format("%-I:%M %p").to_string()
}

fn ranges_in(ranges: &[FreeSlot], time_zone: &Tz) -> String {
    ranges
        .iter()
        .map(|range| {
            format!(
                "{} to {}",
                clock(range.start.with_timezone(time_zone)),
                clock(range.end.with_timezone(time_zone))
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders one day for a recipient in `target`.
///
/// Returns `None` for a day without ranges.
pub fn format_day(day: &DayAvailability, target: TargetTimezone, policy: &SchedulingPolicy) -> Option<FormattedBlock> {
    let first = day.ranges.first()?;
    let local_tz = target.tz();
    let reference_tz = policy.reference_tz();

    Some(FormattedBlock {
        local: format!(
            "{} from {} {}",
            first.start.with_timezone(&local_tz).format("%A, %B %d"),
            ranges_in(&day.ranges, &local_tz),
            target.label()
        ),
        est: format!(
            "{} {}",
            ranges_in(&day.ranges, &reference_tz),
            policy.reference_label
        ),
        start_iso: first.start.with_timezone(&reference_tz).to_rfc3339(),
    })
}

/// Groups, selects and renders free slots for the email.
pub fn format_blocks(slots: &[FreeSlot], target: TargetTimezone, policy: &SchedulingPolicy) -> Vec<FormattedBlock> {
    let days = select_best_days(group_by_day(slots, &target.tz()), policy.max_days);
    days.iter()
        .filter_map(|day| format_day(day, target, policy))
        .collect()
}

/// Bulleted list inserted into prompts and fallback templates.
pub fn slots_text(blocks: &[FormattedBlock]) -> String {
    blocks
        .iter()
        .map(|block| format!("• {}", block.local))
        .collect::<Vec<_>>()
        .join("\n")
}


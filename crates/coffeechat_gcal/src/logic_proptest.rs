#[cfg(test)]
mod tests {
    use crate::logic::{compute_free_slots, BufferPolicy, WorkingHoursPolicy, ALL_WEEKDAYS};
    use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
    use chrono_tz::America::New_York;
    use proptest::prelude::*;

    // Monday 2025-03-03 00:00 EST
    fn base() -> DateTime<Utc> {
        New_York
            .with_ymd_and_hms(2025, 3, 3, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn policy(start_hour: u32, end_hour: u32) -> WorkingHoursPolicy {
        WorkingHoursPolicy::new(
            New_York,
            NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(end_hour, 0, 0).unwrap(),
            ALL_WEEKDAYS[..5].to_vec(),
        )
        .unwrap()
    }

    // Busy intervals as (offset, length) in minutes from the base; a few may be malformed
    fn busy_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
        prop::collection::vec((0..14 * 24 * 60i64, -30..600i64), 0..25)
    }

    fn to_busy(raw: &[(i64, i64)]) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        raw.iter()
            .map(|&(offset, length)| {
                let start = base() + Duration::minutes(offset);
                (start, start + Duration::minutes(length))
            })
            .collect()
    }

    proptest! {
        #[test]
        fn slots_are_sorted_disjoint_and_inside_windows(
            raw_busy in busy_strategy(),
            start_hour in 6..11u32,
            end_hour in 14..20u32,
            buffer_minutes in 0..60i64,
            min_minutes in 15..120i64,
            days in 1..14i64,
        ) {
            let hours = policy(start_hour, end_hour);
            let range_start = base();
            let range_end = base() + Duration::days(days);
            let busy = to_busy(&raw_busy);
            let buffer = BufferPolicy::minutes(buffer_minutes);
            let min_duration = Duration::minutes(min_minutes);

            let slots = compute_free_slots(&busy, range_start, range_end, &hours, &buffer, min_duration).unwrap();
            let windows = hours.windows_in(range_start, range_end);

            for pair in slots.windows(2) {
                prop_assert!(pair[0].end <= pair[1].start, "overlap or disorder: {} / {}", pair[0], pair[1]);
            }
            for slot in &slots {
                prop_assert!(slot.duration() >= min_duration);
                prop_assert!(windows.iter().any(|w| w.contains(slot)), "slot {} outside windows", slot);
                for &(s, e) in &busy {
                    if s < e {
                        let blocked = crate::logic::TimeInterval::new(s, e).map(|b| buffer.apply(&b)).unwrap();
                        prop_assert!(!slot.overlaps(&blocked), "slot {} overlaps busy {}", slot, blocked);
                    }
                }
            }
        }

        #[test]
        fn computation_is_idempotent(raw_busy in busy_strategy(), min_minutes in 15..90i64) {
            let hours = policy(10, 18);
            let busy = to_busy(&raw_busy);
            let buffer = BufferPolicy::minutes(30);
            let end = base() + Duration::days(7);
            let min_duration = Duration::minutes(min_minutes);

            let first = compute_free_slots(&busy, base(), end, &hours, &buffer, min_duration).unwrap();
            let second = compute_free_slots(&busy, base(), end, &hours, &buffer, min_duration).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn empty_calendar_returns_whole_windows(days in 1..21i64, buffer_minutes in 0..120i64) {
            let hours = policy(10, 18);
            let end = base() + Duration::days(days);
            let slots = compute_free_slots(
                &[],
                base(),
                end,
                &hours,
                &BufferPolicy::minutes(buffer_minutes),
                Duration::minutes(30),
            ).unwrap();
            prop_assert_eq!(slots, hours.windows_in(base(), end));
        }

        #[test]
        fn shuffled_input_gives_the_same_result(raw_busy in busy_strategy()) {
            let hours = policy(10, 18);
            let busy = to_busy(&raw_busy);
            let mut reversed = busy.clone();
            reversed.reverse();
            let end = base() + Duration::days(14);
            let buffer = BufferPolicy::minutes(30);

            let a = compute_free_slots(&busy, base(), end, &hours, &buffer, Duration::minutes(30)).unwrap();
            let b = compute_free_slots(&reversed, base(), end, &hours, &buffer, Duration::minutes(30)).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}

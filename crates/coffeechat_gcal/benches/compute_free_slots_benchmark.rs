use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::America::New_York;
use coffeechat_gcal::{compute_free_slots, BufferPolicy, WorkingHoursPolicy};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn range_start() -> DateTime<Utc> {
    New_York
        .with_ymd_and_hms(2025, 3, 3, 0, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

// Busy periods of one hour separated by `gap_hours`, unsorted to exercise the merge
fn busy_periods(count: usize, gap_hours: i64) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut busy: Vec<_> = (0..count as i64)
        .map(|i| {
            let start = range_start() + Duration::hours(i * gap_hours);
            (start, start + Duration::hours(1))
        })
        .collect();
    busy.reverse();
    busy
}

fn benchmark_compute_free_slots(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_free_slots");
    let hours = WorkingHoursPolicy::new(
        New_York,
        NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
    )
    .unwrap();
    let buffer = BufferPolicy::minutes(30);
    let start = range_start();
    let empty: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();

    group.bench_function("two_weeks_empty", |b| {
        b.iter(|| {
            compute_free_slots(
                black_box(&empty),
                black_box(start),
                black_box(start + Duration::days(15)),
                black_box(&hours),
                black_box(&buffer),
                black_box(Duration::minutes(30)),
            )
        })
    });

    let busy = busy_periods(100, 3);
    group.bench_function("two_weeks_100_busy", |b| {
        b.iter(|| {
            compute_free_slots(
                black_box(&busy),
                black_box(start),
                black_box(start + Duration::days(15)),
                black_box(&hours),
                black_box(&buffer),
                black_box(Duration::minutes(30)),
            )
        })
    });

    let dense = busy_periods(2_000, 1);
    group.bench_function("quarter_2000_busy", |b| {
        b.iter(|| {
            compute_free_slots(
                black_box(&dense),
                black_box(start),
                black_box(start + Duration::days(90)),
                black_box(&hours),
                black_box(&buffer),
                black_box(Duration::minutes(60)),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_compute_free_slots);
criterion_main!(benches);

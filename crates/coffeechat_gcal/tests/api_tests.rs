use axum::{body::Body, http::Request, http::StatusCode};
use chrono::{DateTime, Datelike, Duration, Utc};
use chrono_tz::America::New_York;
use coffeechat_common::services::{share_calendar_provider, BoxFuture, CalendarProvider, CalendarStatus, Interval};
use coffeechat_config::SchedulingConfig;
use coffeechat_gcal::{routes::routes, GcalState, SchedulingPolicy};
use std::sync::Arc;
use tower::ServiceExt;

/// Calendar that is busy every weekday from 12:00 to 13:00 Eastern.
struct LunchCalendar;

#[derive(Debug, thiserror::Error)]
#[error("unreachable")]
struct Never;

impl CalendarProvider for LunchCalendar {
    type Error = Never;

    fn list_busy_intervals(
        &self,
        _calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<Interval>, Self::Error> {
        let first = start.with_timezone(&New_York).date_naive();
        let last = end.with_timezone(&New_York).date_naive();
        let busy = first
            .iter_days()
            .take_while(|d| *d <= last)
            .filter_map(|d| {
                let lunch = d.and_hms_opt(12, 0, 0)?.and_local_timezone(New_York).single()?;
                Some((lunch.with_timezone(&Utc), (lunch + Duration::hours(1)).with_timezone(&Utc)))
            })
            .collect();
        Box::pin(async move { Ok(busy) })
    }

    fn check_connection(&self, _calendar_id: &str) -> BoxFuture<'_, CalendarStatus, Self::Error> {
        Box::pin(async { Ok(CalendarStatus::connected(Some("Lunch".to_string()))) })
    }
}

fn app() -> axum::Router {
    let policy = SchedulingPolicy::from_config(&SchedulingConfig::default()).expect("default policy");
    routes(Arc::new(GcalState {
        calendar: Some(share_calendar_provider(LunchCalendar)),
        calendar_id: "primary".to_string(),
        policy: Arc::new(policy),
    }))
}

#[tokio::test]
async fn week_of_lunches_leaves_two_ranges_per_weekday() {
    let today = Utc::now().with_timezone(&New_York).date_naive();
    let next_monday = today + Duration::days(i64::from(7 - today.weekday().num_days_from_monday()));
    let following_monday = next_monday + Duration::days(7);

    let uri = format!(
        "/availability?start_date={}&end_date={}&duration_minutes=30",
        next_monday, following_monday
    );
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let slots = body["slots"].as_array().unwrap();

    // 10:00-11:30 and 13:30-18:00 on each of five weekdays
    assert_eq!(slots.len(), 10);
    for pair in slots.chunks(2) {
        assert_eq!(pair[0]["duration_minutes"], 90);
        assert_eq!(pair[1]["duration_minutes"], 270);
    }
}

#[tokio::test]
async fn status_endpoint_names_the_calendar() {
    let response = app()
        .oneshot(Request::builder().uri("/calendar/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["calendar"], "Lunch");
}

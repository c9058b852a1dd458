// File: crates/coffeechat_gcal/src/handlers.rs
use crate::logic::{
    find_free_slots, meeting_duration, start_of_day, AvailabilityQuery, AvailabilityResponse, FreeSlotDto, GcalError,
    SchedulingPolicy, TargetTimezone,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use coffeechat_common::error::CoffeechatError;
use coffeechat_common::services::{CalendarStatus, SharedCalendarProvider};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared state needed by the calendar handlers.
#[derive(Clone)]
pub struct GcalState {
    /// `None` when Google Calendar is disabled or its credentials failed to load.
    pub calendar: Option<SharedCalendarProvider>,
    pub calendar_id: String,
    pub policy: Arc<SchedulingPolicy>,
}

impl GcalState {
    pub fn provider(&self) -> Result<&SharedCalendarProvider, GcalError> {
        self.calendar.as_ref().ok_or(GcalError::NotConnected)
    }
}

/// Parses a YYYY-MM-DD query value.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, GcalError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| GcalError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Handler returning the raw free ranges of a date range.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free ranges in the reference timezone", body = AvailabilityResponse),
        (status = 400, description = "Invalid dates, duration or timezone"),
        (status = 502, description = "Calendar provider failed"),
        (status = 503, description = "Calendar not connected")
    ),
    tag = "Calendar"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, CoffeechatError> {
    let provider = state.provider()?;
    let reference_tz = state.policy.reference_tz();

    let start_date = parse_date("start_date", &query.start_date)?;
    let end_date = parse_date("end_date", &query.end_date)?;
    let target: TargetTimezone = query
        .timezone
        .as_deref()
        .map(str::parse::<TargetTimezone>)
        .transpose()
        .map_err(GcalError::from)?
        .unwrap_or(TargetTimezone::Eastern);
    let min_duration = meeting_duration(query.duration_minutes).map_err(GcalError::from)?;

    let (Some(range_start), Some(range_end)) = (
        start_of_day(start_date, &reference_tz),
        start_of_day(end_date, &reference_tz),
    ) else {
        return Err(GcalError::InvalidDate {
            field: "start_date",
            value: query.start_date.clone(),
        }
        .into());
    };
    info!(
        "Availability request {} .. {} for {} minutes ({})",
        start_date, end_date, query.duration_minutes, target
    );

    let slots = find_free_slots(
        &**provider,
        &state.calendar_id,
        &state.policy,
        range_start,
        range_end,
        min_duration,
        target,
        Utc::now(),
    )
    .await?;

    Ok(Json(AvailabilityResponse {
        slots: slots
            .iter()
            .map(|slot| FreeSlotDto::from_slot(slot, &reference_tz))
            .collect(),
        timezone: target,
    }))
}

/// Handler reporting whether the calendar credentials work.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/calendar/status",
    responses(
        (status = 200, description = "Calendar reachable", body = CalendarStatus),
        (status = 500, description = "Calendar not connected", body = CalendarStatus)
    ),
    tag = "Calendar"
))]
pub async fn calendar_status_handler(
    State(state): State<Arc<GcalState>>,
) -> (StatusCode, Json<CalendarStatus>) {
    let Some(provider) = state.calendar.as_ref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(CalendarStatus::disconnected(
                "Calendar not connected. Check that GCAL_CREDENTIALS is set correctly.",
            )),
        );
    };

    match provider.check_connection(&state.calendar_id).await {
        Ok(status) => (StatusCode::OK, Json(status)),
        Err(e) => {
            warn!("Calendar connection check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CalendarStatus::disconnected(e.to_string())),
            )
        }
    }
}

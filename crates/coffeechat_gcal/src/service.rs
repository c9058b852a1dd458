// --- File: crates/coffeechat_gcal/src/service.rs ---
//! Google Calendar implementation of [`CalendarProvider`].

use chrono::{DateTime, Utc};
use coffeechat_common::services::{BoxFuture, CalendarProvider, CalendarStatus, Interval};
use google_calendar3::api::{FreeBusyRequest, FreeBusyRequestItem};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::HubType;

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Calendar '{0}' not present in free/busy response")]
    CalendarMissing(String),
}

/// Google Calendar service implementation.
#[derive(Clone)]
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarService {
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

impl CalendarProvider for GoogleCalendarService {
    type Error = GcalServiceError;

    /// Busy periods from the `freebusy.query` endpoint.
    ///
    /// Periods lacking a start or end are skipped. Calendars the credentials cannot read
    /// come back with an `errors` list instead of busy periods; that is reported as an error
    /// rather than as an empty (fully free) calendar.
    fn list_busy_intervals(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<Interval>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let req = FreeBusyRequest {
                time_min: Some(start),
                time_max: Some(end),
                time_zone: Some("UTC".to_string()),
                items: Some(vec![FreeBusyRequestItem {
                    id: Some(calendar_id.clone()),
                    ..Default::default()
                }]),
                ..Default::default()
            };

            let (_response, freebusy_response) = calendar_hub.freebusy().query(req).doit().await?;

            let cal_info = freebusy_response
                .calendars
                .and_then(|mut calendars| calendars.remove(&calendar_id))
                .ok_or_else(|| GcalServiceError::CalendarMissing(calendar_id.clone()))?;

            if let Some(errors) = cal_info.errors.filter(|errors| !errors.is_empty()) {
                let reasons: Vec<String> = errors
                    .into_iter()
                    .filter_map(|e| e.reason)
                    .collect();
                warn!("Free/busy errors for {}: {:?}", calendar_id, reasons);
                return Err(GcalServiceError::CalendarMissing(format!(
                    "{} ({})",
                    calendar_id,
                    reasons.join(", ")
                )));
            }

            let mut busy_periods = Vec::new();
            for period in cal_info.busy.unwrap_or_default() {
                match (period.start, period.end) {
                    (Some(start_dt), Some(end_dt)) => busy_periods.push((start_dt, end_dt)),
                    _ => warn!("Skipping busy period with missing start/end: {:?}", period),
                }
            }
            debug!("Fetched {} busy periods for {}", busy_periods.len(), calendar_id);
            Ok(busy_periods)
        })
    }

    fn check_connection(&self, calendar_id: &str) -> BoxFuture<'_, CalendarStatus, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let (_response, list) = calendar_hub
                .calendar_list()
                .list()
                .max_results(1)
                .doit()
                .await?;
            let summary = list
                .items
                .and_then(|items| items.into_iter().next())
                .and_then(|entry| entry.summary)
                .unwrap_or(calendar_id);
            Ok(CalendarStatus::connected(Some(summary)))
        })
    }
}

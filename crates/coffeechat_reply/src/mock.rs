// --- File: crates/coffeechat_reply/src/mock.rs ---
//! In-memory providers for the reply tests.

use crate::logic::ReplyState;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::America::New_York;
use coffeechat_common::services::{
    share_calendar_provider, share_text_generator, BoxFuture, CalendarProvider, CalendarStatus,
    Interval, TextGenerator,
};
use coffeechat_config::SchedulingConfig;
use coffeechat_gcal::{GcalState, SchedulingPolicy};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

#[derive(Default)]
pub struct StaticCalendar {
    pub busy: Vec<Interval>,
}

impl CalendarProvider for StaticCalendar {
    type Error = MockError;

    fn list_busy_intervals(
        &self,
        _calendar_id: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<Interval>, Self::Error> {
        let busy = self.busy.clone();
        Box::pin(async move { Ok(busy) })
    }

    fn check_connection(&self, calendar_id: &str) -> BoxFuture<'_, CalendarStatus, Self::Error> {
        let name = calendar_id.to_string();
        Box::pin(async move { Ok(CalendarStatus::connected(Some(name))) })
    }
}

/// Answers prompts from a queue and records them. An exhausted queue is an error.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<S, S>>,
        S: Into<String>,
    {
        Self {
            replies: Arc::new(Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(Into::into).map_err(Into::into))
                    .collect(),
            )),
            prompts: Arc::default(),
        }
    }

    pub fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    type Error = MockError;

    fn generate(&self, prompt: &str) -> BoxFuture<'_, String, Self::Error> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.replies.lock().unwrap().pop_front();
        Box::pin(async move {
            match next {
                Some(Ok(text)) => Ok(text),
                Some(Err(e)) => Err(MockError(e)),
                None => Err(MockError("no scripted reply".to_string())),
            }
        })
    }
}

/// Eastern wall-clock time on a March 2025 day.
pub fn et(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    New_York
        .with_ymd_and_hms(2025, 3, day, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// Wednesday 2025-03-05, noon Eastern.
pub fn now() -> DateTime<Utc> {
    et(5, 12, 0)
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
}

pub fn policy() -> SchedulingPolicy {
    SchedulingPolicy::from_config(&SchedulingConfig::default()).unwrap()
}

/// Busy on Monday 2025-03-10 from 13:00 to 14:00 Eastern.
pub fn monday_meeting() -> StaticCalendar {
    StaticCalendar {
        busy: vec![(et(10, 13, 0), et(10, 14, 0))],
    }
}

pub fn state(calendar: Option<StaticCalendar>, generator: Option<ScriptedGenerator>) -> ReplyState {
    ReplyState {
        gcal: GcalState {
            calendar: calendar.map(share_calendar_provider),
            calendar_id: "primary".to_string(),
            policy: Arc::new(policy()),
        },
        generator: generator.map(share_text_generator),
        signature_name: "Candice".to_string(),
    }
}

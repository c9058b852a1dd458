// --- File: crates/coffeechat_gcal/src/lib.rs ---
pub mod auth;
#[cfg(test)]
mod auth_test;
pub mod doc;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod routes;
pub mod service;

pub use handlers::GcalState;
pub use logic::{
    compute_free_slots, find_free_slots, meeting_duration, AvailabilityError, BufferPolicy, FreeSlot, GcalError,
    SchedulingPolicy, TargetTimezone, TimeInterval, WorkingHoursPolicy, MAX_RANGE_DAYS,
};
pub use service::GoogleCalendarService;

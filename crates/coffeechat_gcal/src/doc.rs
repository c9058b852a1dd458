// File: crates/coffeechat_gcal/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{__path_calendar_status_handler, __path_get_availability_handler};
use crate::logic::{AvailabilityQuery, AvailabilityResponse, FreeSlotDto, TargetTimezone};
use coffeechat_common::services::CalendarStatus;

#[derive(OpenApi)]
#[openapi(
    paths(get_availability_handler, calendar_status_handler),
    components(schemas(
        AvailabilityQuery,
        AvailabilityResponse,
        FreeSlotDto,
        TargetTimezone,
        CalendarStatus
    )),
    tags(
        (name = "Calendar", description = "Free/busy lookup and availability")
    )
)]
pub struct GcalApiDoc;

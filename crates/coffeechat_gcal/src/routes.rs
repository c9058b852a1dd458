// --- File: crates/coffeechat_gcal/src/routes.rs ---

use crate::handlers::{calendar_status_handler, get_availability_handler, GcalState};
use axum::{routing::get, Router};
use std::sync::Arc;

/// Creates a router containing the calendar routes.
///
/// The state is built by the caller so tests can inject an in-memory provider.
pub fn routes(state: Arc<GcalState>) -> Router {
    Router::new()
        .route("/availability", get(get_availability_handler))
        .route("/calendar/status", get(calendar_status_handler))
        .with_state(state)
}

// --- File: crates/coffeechat_reply/src/routes.rs ---

use crate::handlers::{compose_handler, generate_handler, refine_handler};
use crate::logic::ReplyState;
use axum::{routing::post, Router};
use std::sync::Arc;

pub fn routes(state: Arc<ReplyState>) -> Router {
    Router::new()
        .route("/generate", post(generate_handler))
        .route("/compose", post(compose_handler))
        .route("/refine", post(refine_handler))
        .with_state(state)
}

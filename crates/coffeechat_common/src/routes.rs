use axum::{routing::get, Router};

use crate::handlers::health;

/// Routes shared by every deployment, independent of which providers are enabled.
pub fn routes() -> Router {
    Router::new().route("/health", get(health))
}

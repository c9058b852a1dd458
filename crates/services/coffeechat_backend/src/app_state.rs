// --- File: crates/services/coffeechat_backend/src/app_state.rs ---
use crate::service_factory::CoffeechatServiceFactory;
use axum::Router;
use coffeechat_common::error::{config_error, CoffeechatError};
use coffeechat_config::AppConfig;
use coffeechat_gcal::{routes::routes as gcal_routes, GcalState, SchedulingPolicy};
use coffeechat_reply::{routes::routes as reply_routes, ReplyState};
use http::{header, HeaderValue, Method};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

/// Calendar used when the config does not name one.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// State shared by every route, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gcal: Arc<GcalState>,
    pub reply: Arc<ReplyState>,
}

impl AppState {
    /// Builds the providers enabled in `config` and the scheduling policy.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, CoffeechatError> {
        let factory = CoffeechatServiceFactory::new(&config).await;
        Self::with_factory(config, &factory)
    }

    /// Fails only when the scheduling section is invalid.
    pub fn with_factory(config: Arc<AppConfig>, factory: &CoffeechatServiceFactory) -> Result<Self, CoffeechatError> {
        let policy = SchedulingPolicy::from_config(&config.scheduling)
            .map_err(|e| config_error(format!("invalid scheduling settings: {}", e)))?;
        let calendar_id = config
            .gcal
            .as_ref()
            .and_then(|gcal| gcal.calendar_id.clone())
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());

        let gcal = GcalState {
            calendar: factory.calendar_provider(),
            calendar_id,
            policy: Arc::new(policy),
        };
        let reply = ReplyState {
            gcal: gcal.clone(),
            generator: factory.text_generator(),
            signature_name: config.reply.signature_name.clone(),
        };

        Ok(Self {
            config,
            gcal: Arc::new(gcal),
            reply: Arc::new(reply),
        })
    }

    /// Health, calendar and reply routes merged at the root.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(coffeechat_common::routes())
            .merge(gcal_routes(self.gcal.clone()))
            .merge(reply_routes(self.reply.clone()))
    }
}

/// CORS for the configured origins. Unparseable origins are skipped.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim_end_matches('/')) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

use axum::{body::Body, http::Request, http::StatusCode, Router};
use chrono::{DateTime, Utc};
use coffeechat_backend::{cors_layer, AppState, CoffeechatServiceFactory};
use coffeechat_common::services::{
    share_calendar_provider, share_text_generator, BoxFuture, CalendarProvider, CalendarStatus, Interval,
    TextGenerator,
};
use coffeechat_config::{AppConfig, GcalConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Debug, thiserror::Error)]
#[error("offline")]
struct Offline;

struct FreeCalendar;

impl CalendarProvider for FreeCalendar {
    type Error = Offline;

    fn list_busy_intervals(
        &self,
        _calendar_id: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<Interval>, Self::Error> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn check_connection(&self, calendar_id: &str) -> BoxFuture<'_, CalendarStatus, Self::Error> {
        let name = calendar_id.to_string();
        Box::pin(async move { Ok(CalendarStatus::connected(Some(name))) })
    }
}

struct EchoGenerator;

impl TextGenerator for EchoGenerator {
    type Error = Offline;

    fn generate(&self, _prompt: &str) -> BoxFuture<'_, String, Self::Error> {
        Box::pin(async { Ok("Refined draft".to_string()) })
    }
}

fn config() -> AppConfig {
    AppConfig {
        gcal: Some(GcalConfig {
            calendar_id: Some("team@example.com".to_string()),
            ..GcalConfig::default()
        }),
        ..AppConfig::default()
    }
}

fn app(factory: CoffeechatServiceFactory) -> Router {
    AppState::with_factory(Arc::new(config()), &factory)
        .unwrap()
        .router()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_always_served() {
    let (status, body) = send(app(CoffeechatServiceFactory::default()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn routes_use_the_configured_calendar() {
    let factory = CoffeechatServiceFactory::from_providers(Some(share_calendar_provider(FreeCalendar)), None);
    let (status, body) = send(app(factory), get("/calendar/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["calendar"], "team@example.com");
}

#[tokio::test]
async fn missing_providers_degrade_per_route() {
    let app = app(CoffeechatServiceFactory::default());

    let (status, body) = send(app.clone(), get("/calendar/status")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["connected"], false);

    let (status, _) = send(
        app.clone(),
        post("/compose", json!({ "recipient_name": "Sam" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(
        app,
        post("/refine", json!({ "current_reply": "Hi", "feedback": "shorter" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn full_stack_compose_and_refine() {
    let factory = CoffeechatServiceFactory::from_providers(
        Some(share_calendar_provider(FreeCalendar)),
        Some(share_text_generator(EchoGenerator)),
    );
    let app = app(factory);

    let (status, body) = send(
        app.clone(),
        post("/compose", json!({ "recipient_name": "Sam", "timezone": "PST" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timezone"], "PST");
    assert_eq!(body["blocks"].as_array().unwrap().len(), 4);

    let (status, body) = send(
        app,
        post("/refine", json!({ "current_reply": "Hi Sam", "feedback": "warmer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Refined draft");
}

#[test]
fn invalid_scheduling_settings_are_a_config_error() {
    let mut config = config();
    config.scheduling.work_start_time = "19:00".to_string();
    let result = AppState::with_factory(Arc::new(config), &CoffeechatServiceFactory::default());
    assert!(matches!(
        result,
        Err(coffeechat_common::CoffeechatError::ConfigError(_))
    ));
}

#[tokio::test]
async fn cors_allows_configured_origins_only() {
    let app = app(CoffeechatServiceFactory::default()).layer(cors_layer(&[
        "https://candiceshen.com/".to_string(),
        "bad\norigin".to_string(),
    ]));

    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/generate")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(preflight("https://candiceshen.com"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://candiceshen.com"
    );

    let response = app.oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

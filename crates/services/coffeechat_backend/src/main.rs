// File: services/coffeechat_backend/src/main.rs
use coffeechat_backend::{cors_layer, AppState};
use coffeechat_common::{logging, Context};
use coffeechat_config::load_config;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(load_config().context("Failed to load config")?);
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = logging::init_from_config(&config.logging);

    let state = AppState::new(config.clone()).await?;
    let mut app = state.router();

    #[cfg(feature = "openapi")]
    {
        use coffeechat_common::handlers::{HealthResponse, __path_health};
        use coffeechat_gcal::doc::GcalApiDoc;
        use coffeechat_reply::doc::ReplyApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Coffee Chat API",
                version = "0.1.0",
                description = "Availability lookup and meeting reply drafting",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            paths(health),
            components(schemas(HealthResponse)),
            tags((name = "Health", description = "Liveness"))
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(GcalApiDoc::openapi());
        openapi_doc.merge(ReplyApiDoc::openapi());
        info!("📖 Adding Swagger UI at /docs");
        app = app.merge(SwaggerUi::new("/docs").url("/docs/openapi.json", openapi_doc));
    }

    if let Some(dir) = config.server.static_dir.as_deref() {
        if Path::new(dir).is_dir() {
            info!("Serving front end from {}", dir);
            app = app.fallback_service(ServeDir::new(dir));
        } else {
            warn!("Static directory {} not found, front end disabled", dir);
        }
    }

    let app = app
        .layer(cors_layer(&config.server.allowed_origins))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Starting server at http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

// File: crates/coffeechat_reply/src/handlers.rs
use crate::logic::{
    compose_email, generate_reply, refine_reply, ComposeRequest, GenerateOutcome, GenerateRequest,
    RefineRequest, RefineResponse, ReplyDraft, ReplyState,
};
use axum::{extract::State, response::Json};
use chrono::Utc;
use coffeechat_common::error::CoffeechatError;
use std::sync::Arc;
use tracing::info;

/// Drafts a reply to a pasted email.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Draft reply, or the details that still need clarification", body = GenerateOutcome),
        (status = 400, description = "No availability in the requested range"),
        (status = 502, description = "Calendar provider failed"),
        (status = 503, description = "Calendar not connected")
    ),
    tag = "Reply"
))]
pub async fn generate_handler(
    State(state): State<Arc<ReplyState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateOutcome>, CoffeechatError> {
    info!("Generating reply for a {}-character email", request.email_text.len());
    Ok(Json(generate_reply(&state, request, Utc::now()).await?))
}

/// Drafts an outbound meeting request.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/compose",
    request_body = ComposeRequest,
    responses(
        (status = 200, description = "Draft email", body = ReplyDraft),
        (status = 400, description = "Invalid timezone or duration, or no availability"),
        (status = 503, description = "Calendar not connected")
    ),
    tag = "Reply"
))]
pub async fn compose_handler(
    State(state): State<Arc<ReplyState>>,
    Json(request): Json<ComposeRequest>,
) -> Result<Json<ReplyDraft>, CoffeechatError> {
    info!("Composing meeting request for {}", request.recipient_name);
    Ok(Json(compose_email(&state, request, Utc::now()).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/refine",
    request_body = RefineRequest,
    responses(
        (status = 200, description = "Rewritten draft", body = RefineResponse),
        (status = 400, description = "Empty feedback"),
        (status = 500, description = "Text generation failed")
    ),
    tag = "Reply"
))]
pub async fn refine_handler(
    State(state): State<Arc<ReplyState>>,
    Json(request): Json<RefineRequest>,
) -> Result<Json<RefineResponse>, CoffeechatError> {
    Ok(Json(refine_reply(&state, request).await?))
}

// File: crates/coffeechat_reply/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::email::EmailAnalysis;
use crate::format::FormattedBlock;
use crate::handlers::{__path_compose_handler, __path_generate_handler, __path_refine_handler};
use crate::logic::{
    ClarificationResponse, ComposeRequest, GenerateOutcome, GenerateRequest, GenerateResponse,
    RefineRequest, RefineResponse, ReplyDraft,
};

#[derive(OpenApi)]
#[openapi(
    paths(generate_handler, compose_handler, refine_handler),
    components(schemas(
        GenerateRequest,
        GenerateOutcome,
        GenerateResponse,
        ClarificationResponse,
        EmailAnalysis,
        ComposeRequest,
        ReplyDraft,
        FormattedBlock,
        RefineRequest,
        RefineResponse
    )),
    tags(
        (name = "Reply", description = "Email analysis and reply drafting")
    )
)]
pub struct ReplyApiDoc;

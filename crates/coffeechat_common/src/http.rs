// --- File: crates/coffeechat_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{CoffeechatError, HttpStatusCode};

// Include the client module
pub mod client;

/// Extension trait for CoffeechatError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for CoffeechatError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // The front end reads `error` as a plain message.
        let body = Json(json!({
            "error": self.to_string(),
            "code": status_code.as_u16(),
        }));

        (status_code, body).into_response()
    }
}

impl IntoResponse for CoffeechatError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::validation_error;

    #[tokio::test]
    async fn error_renders_status_and_message() {
        let response = validation_error("end_date must be after start_date").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["code"], 400);
        assert!(body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("end_date must be after start_date"));
    }

    #[test]
    fn unavailable_features_render_503() {
        let response = crate::error::service_disabled("calendar not connected").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

// --- File: crates/coffeechat_openai/src/error.rs ---
use coffeechat_common::{external_service_error, CoffeechatError};
use thiserror::Error;

/// OpenAI-specific error types.
#[derive(Error, Debug)]
pub enum OpenAiError {
    /// Error occurred during an OpenAI API request
    #[error("OpenAI API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Non-success status returned by the API
    #[error("OpenAI API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing the API response
    #[error("Failed to parse OpenAI API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The response carried no usable completion
    #[error("OpenAI response contained no completion")]
    EmptyResponse,

    /// Missing or incomplete OpenAI configuration
    #[error("OpenAI configuration missing or incomplete: {0}")]
    ConfigError(String),
}

impl From<OpenAiError> for CoffeechatError {
    fn from(err: OpenAiError) -> Self {
        match err {
            OpenAiError::RequestError(e) if e.is_timeout() => {
                CoffeechatError::TimeoutError(format!("OpenAI request timed out: {}", e))
            }
            OpenAiError::RequestError(e) => {
                CoffeechatError::HttpError(format!("OpenAI request error: {}", e))
            }
            OpenAiError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "OpenAI API",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            OpenAiError::ParseError(e) => {
                external_service_error("OpenAI API", format!("unreadable response: {}", e))
            }
            OpenAiError::EmptyResponse => {
                external_service_error("OpenAI API", "response contained no completion")
            }
            OpenAiError::ConfigError(msg) => CoffeechatError::ConfigError(msg),
        }
    }
}

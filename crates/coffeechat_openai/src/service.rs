// --- File: crates/coffeechat_openai/src/service.rs ---
use crate::error::OpenAiError;
use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use coffeechat_common::http::client::create_client;
use coffeechat_common::services::{BoxFuture, TextGenerator};
use coffeechat_config::OpenAiConfig;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

/// Chat-completions client used to analyze and draft emails.
#[derive(Clone)]
pub struct OpenAiService {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiService {
    /// Builds the service from configuration. Fails when no API key is set.
    pub fn new(config: &OpenAiConfig) -> Result<Self, OpenAiError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| OpenAiError::ConfigError("OPENAI_API_KEY is not set".to_string()))?
            .to_string();

        let client = create_client(config.timeout_secs, true)?;
        info!("OpenAI text generator configured with model {}", config.model);

        Ok(Self {
            client,
            api_key,
            api_url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a single user message and returns the trimmed first completion.
    pub async fn complete(&self, prompt: &str) -> Result<String, OpenAiError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: self.max_tokens,
        };

        debug!("Calling OpenAI chat completions ({} prompt chars)", prompt.len());
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, body));
        }

        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "OpenAI usage: {} prompt + {} completion = {} tokens",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(OpenAiError::EmptyResponse)
    }

    fn status_error(status: StatusCode, body: String) -> OpenAiError {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("OpenAI rejected the API key: {}", message)
            }
            StatusCode::TOO_MANY_REQUESTS => warn!("OpenAI rate limit hit: {}", message),
            _ => warn!("OpenAI returned {}: {}", status, message),
        }

        OpenAiError::ApiError {
            status_code: status.as_u16(),
            message,
        }
    }

    #[cfg(test)]
    fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

impl TextGenerator for OpenAiService {
    type Error = OpenAiError;

    fn generate(&self, prompt: &str) -> BoxFuture<'_, String, Self::Error> {
        let prompt = prompt.to_string();
        Box::pin(async move { self.complete(&prompt).await })
    }
}

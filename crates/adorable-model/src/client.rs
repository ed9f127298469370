//! HTTP client for OpenAI-compatible chat-completions endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use adorable_contracts::{
    error::{AdorableError, AdorableResult},
    model::{ModelRequest, ModelResponse},
};
use adorable_core::traits::LanguageModel;

use crate::wire::{chat_request, model_response, ChatResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and as whom to call the model. Built once at startup.
#[derive(Clone)]
pub struct ModelEndpoint {
    pub model: String,
    pub base_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for ModelEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEndpoint")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// A `LanguageModel` backed by `{base_url}/chat/completions`.
pub struct OpenAiChatModel {
    client: Client,
    endpoint: ModelEndpoint,
}

impl OpenAiChatModel {
    /// # Errors
    ///
    /// `ConfigError` if the HTTP client cannot be built.
    pub fn new(endpoint: ModelEndpoint) -> AdorableResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AdorableError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, endpoint })
    }

    pub fn model(&self) -> &str {
        &self.endpoint.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn complete(&self, request: &ModelRequest) -> AdorableResult<ModelResponse> {
        let body = chat_request(&self.endpoint.model, request);
        debug!(
            model = %self.endpoint.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "calling model"
        );

        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.endpoint.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("request timed out after {}s", REQUEST_TIMEOUT.as_secs())
                } else if e.is_connect() {
                    format!("connection failed: {e}")
                } else {
                    format!("request failed: {e}")
                };
                error!(model = %self.endpoint.model, %reason, "model request failed");
                AdorableError::ModelInvocation { reason }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            error!(model = %self.endpoint.model, %status, "model API error");
            return Err(AdorableError::ModelInvocation {
                reason: format!("API returned {status}: {text}"),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| AdorableError::ModelInvocation {
            reason: format!("failed to parse response: {e}"),
        })?;
        let result = model_response(parsed)?;

        debug!(
            model = %self.endpoint.model,
            tool_calls = result.tool_calls.len(),
            has_text = result.content.is_some(),
            "model responded"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::{ModelEndpoint, OpenAiChatModel};

    fn endpoint(base_url: &str) -> ModelEndpoint {
        ModelEndpoint {
            model: "openai/gpt-4o-mini".to_string(),
            base_url: base_url.to_string(),
            api_key: "sk-secret".to_string(),
        }
    }

    #[test]
    fn test_url_joins_base() {
        let model = OpenAiChatModel::new(endpoint("https://openrouter.ai/api/v1/")).unwrap();
        assert_eq!(model.url(), "https://openrouter.ai/api/v1/chat/completions");
        assert_eq!(model.model(), "openai/gpt-4o-mini");
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", endpoint("https://x"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}

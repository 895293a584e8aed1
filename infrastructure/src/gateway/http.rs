//! OpenAI-compatible chat completions gateway.

use agentloop_application::ports::model_gateway::{GatewayError, ModelGateway, PromptContext};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for [`OpenAiCompatibleGateway`].
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Gateway that POSTs to `{endpoint}/chat/completions`.
pub struct OpenAiCompatibleGateway {
    config: HttpGatewayConfig,
    client: reqwest::Client,
}

impl OpenAiCompatibleGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        if config.endpoint.trim().is_empty() {
            return Err(GatewayError::Misconfigured("endpoint is empty".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(GatewayError::Misconfigured("model is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Misconfigured(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }
}

fn request_body(model: &str, prompt: &PromptContext) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": prompt.system },
            { "role": "user", "content": prompt.user },
        ],
    })
}

fn status_error(status: u16, body: String, model: &str) -> GatewayError {
    match status {
        401 | 403 => GatewayError::Unauthorized(body),
        404 => GatewayError::ModelNotAvailable(model.to_string()),
        _ => GatewayError::RequestFailed(format!("HTTP {}: {}", status, body)),
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

/// Content of the first choice's message.
fn first_choice_content(data: &serde_json::Value) -> Result<String, GatewayError> {
    data.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(str::to_string)
        .ok_or_else(|| GatewayError::InvalidResponse("No content in first choice".to_string()))
}

#[async_trait]
impl ModelGateway for OpenAiCompatibleGateway {
    async fn complete(&self, prompt: &PromptContext) -> Result<String, GatewayError> {
        debug!(
            model = %self.config.model,
            purpose = prompt.purpose.as_str(),
            "Sending chat completion"
        );

        let mut request = self.client.post(self.url()).json(&request_body(&self.config.model, prompt));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Chat completion failed");
            return Err(status_error(status.as_u16(), body, &self.config.model));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        first_choice_content(&data)
    }
}

//! OpenRouter API client implementation.
//!
//! Single-shot: every `generate` call performs exactly one HTTP request. Retries
//! live in [`with_retry`](super::with_retry) so the pipeline controls them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::LlmError;
use super::{
    ContentPart, GenerationClient, GenerationRequest, GenerationResponse, ReasoningEffort,
    TokenUsage,
};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// OpenRouter API client.
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    api_url: String,
    timeout: Option<Duration>,
}

impl OpenRouterClient {
    /// Create a new OpenRouter client against the public endpoint.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_url: OPENROUTER_API_URL.to_string(),
            timeout: None,
        }
    }

    /// Use a different OpenAI-compatible chat-completions endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Apply a per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn build_request(request: &GenerationRequest) -> OpenRouterRequest {
        if let Some(ref store) = request.grounding_store {
            tracing::debug!(
                "OpenRouter has no grounding store support; ignoring store '{}'",
                store
            );
        }

        let parts: Vec<Value> = request.contents.iter().map(Self::wire_part).collect();

        OpenRouterRequest {
            model: request.model.clone(),
            messages: vec![
                json!({ "role": "system", "content": request.system_instruction }),
                json!({ "role": "user", "content": parts }),
            ],
            reasoning: request.reasoning_effort.map(|effort| match effort {
                ReasoningEffort::Low => json!({ "effort": "low" }),
                ReasoningEffort::Medium => json!({ "effort": "medium" }),
                ReasoningEffort::High => json!({ "effort": "high" }),
                ReasoningEffort::Budget(tokens) => json!({ "max_tokens": tokens }),
            }),
        }
    }

    fn wire_part(part: &ContentPart) -> Value {
        match part {
            ContentPart::Text { text } => json!({ "type": "text", "text": text }),
            ContentPart::File { mime_type, uri } if mime_type.starts_with("image/") => {
                json!({ "type": "image_url", "image_url": { "url": uri } })
            }
            ContentPart::File { uri, .. } => {
                let filename = uri.rsplit('/').next().unwrap_or(uri.as_str());
                json!({ "type": "file", "file": { "filename": filename, "file_data": uri } })
            }
        }
    }

    /// Interpret a response body.
    fn parse_body(body: &str, model: &str) -> Result<GenerationResponse, LlmError> {
        let parsed: OpenRouterResponse = serde_json::from_str(body).map_err(|e| {
            LlmError::parse_error(format!("Failed to parse response: {}, body: {}", e, body))
        })?;

        // OpenRouter sometimes reports upstream failures in a 200 body.
        if let Some(error) = parsed.error {
            return Err(match error.code {
                Some(code) => LlmError::from_status(code, error.message),
                None => LlmError::network_error(error.message),
            });
        }

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::parse_error("No choices in response"))?;

        Ok(GenerationResponse {
            text: choice.message.content.unwrap_or_default(),
            usage: parsed
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
            model: parsed.model.or_else(|| Some(model.to_string())),
        })
    }
}

#[async_trait]
impl GenerationClient for OpenRouterClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let body = Self::build_request(request);

        tracing::debug!(
            "Sending request to OpenRouter: model={}, parts={}",
            request.model,
            request.contents.len()
        );

        let mut builder = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "Report Enhancer")
            .json(&body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(LlmError::timeout(format!("Request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(LlmError::network_error(format!("Connection failed: {}", e)));
                } else {
                    return Err(LlmError::network_error(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), text));
        }

        let generated = Self::parse_body(&text, &request.model)?;
        if let Some(usage) = generated.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenRouter call completed"
            );
        }
        Ok(generated)
    }
}

/// OpenRouter API request format.
#[derive(Debug, Serialize)]
struct OpenRouterRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<Value>,
}

/// OpenRouter API response format.
#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    #[serde(default)]
    choices: Vec<OpenRouterChoice>,
    #[serde(default)]
    usage: Option<OpenRouterUsage>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    error: Option<OpenRouterError>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: OpenRouterMessage,
}

#[derive(Debug, Deserialize)]
struct OpenRouterMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterError {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// Usage data (OpenAI-compatible).
#[derive(Debug, Deserialize)]
struct OpenRouterUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

// ABOUTME: OpenAI-compatible chat completion provider with JSON mode and vision input
// ABOUTME: Serves any endpoint speaking the /chat/completions dialect (OpenAI, vLLM, LocalAI)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # OpenAI-Compatible Provider
//!
//! Implementation of the [`LlmProvider`] trait for any endpoint that speaks
//! the OpenAI `/chat/completions` dialect. This is the provider behind both
//! the structured plan analysis and the vision physique scan.
//!
//! ## Configuration
//!
//! - `OPENAI_API_KEY`: API key (required)
//! - `OPENAI_BASE_URL`: endpoint base (default `https://api.openai.com/v1`)
//! - `OPENAI_MODEL`: default model (default `gpt-4o`)

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, instrument, warn};

use super::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, TokenUsage};
use crate::errors::AppError;

/// Environment variable for the API key
const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default endpoint base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model to use
const DEFAULT_MODEL: &str = "gpt-4o";

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

/// Message body: plain text or multimodal content parts
#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: ApiContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text {
        text: String,
    },
    ImageUrl {
        image_url: ImageUrlPart,
    },
}

#[derive(Debug, Serialize)]
struct ImageUrlPart {
    url: String,
    detail: &'static str,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

/// API error response
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Configuration for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Endpoint base URL, without the trailing `/chat/completions`
    pub base_url: String,
    /// Bearer token, if the endpoint requires one
    pub api_key: Option<String>,
    /// Model used when the request does not name one
    pub default_model: String,
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            default_model: DEFAULT_MODEL.to_owned(),
        }
    }
}

/// Provider for any endpoint speaking the OpenAI chat-completions dialect
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a provider with an explicit configuration
    #[must_use]
    pub fn new(config: OpenAiCompatibleConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Create a provider from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            AppError::config_missing(format!("Missing {API_KEY_ENV} environment variable"))
        })?;

        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        let default_model = std::env::var("OPENAI_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());

        Ok(Self::new(OpenAiCompatibleConfig {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: Some(api_key),
            default_model,
        }))
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.config.base_url)
    }

    /// Convert internal messages to API format, attaching the request image
    /// (if any) to the last user message as multimodal content parts.
    async fn convert_messages(request: &ChatRequest) -> Result<Vec<ApiMessage>, AppError> {
        let image_url = match &request.image {
            Some(attachment) => Some(resolve_image_url(&attachment.url).await?),
            None => None,
        };

        let last_user_idx = request
            .messages
            .iter()
            .rposition(|m| matches!(m.role, super::MessageRole::User));

        let mut out = Vec::with_capacity(request.messages.len());
        for (idx, message) in request.messages.iter().enumerate() {
            let content = match (&image_url, last_user_idx) {
                (Some(url), Some(user_idx)) if idx == user_idx => ApiContent::Parts(vec![
                    ContentPart::Text {
                        text: message.content.clone(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrlPart {
                            url: url.clone(),
                            detail: "low",
                        },
                    },
                ]),
                _ => ApiContent::Text(message.content.clone()),
            };
            out.push(ApiMessage {
                role: message.role.as_str().to_owned(),
                content,
            });
        }
        Ok(out)
    }

    /// Parse error response from the API
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(body) {
            let error_type = error_response
                .error
                .error_type
                .unwrap_or_else(|| "unknown".to_owned());

            match status.as_u16() {
                400 => AppError::invalid_input(format!(
                    "Completion API validation error: {}",
                    error_response.error.message
                )),
                429 => AppError::external_service(
                    "OpenAI",
                    format!("Rate limit exceeded: {}", error_response.error.message),
                ),
                _ => AppError::external_service(
                    "OpenAI",
                    format!("{} - {}", error_type, error_response.error.message),
                ),
            }
        } else {
            AppError::external_service(
                "OpenAI",
                format!(
                    "API error ({}): {}",
                    status,
                    body.chars().take(200).collect::<String>()
                ),
            )
        }
    }
}

/// Resolve an image attachment into something the API accepts.
///
/// `https://` and `data:` URLs pass through; `file://` URLs and bare paths
/// are read from disk and inlined as base64 data URLs.
async fn resolve_image_url(url: &str) -> Result<String, AppError> {
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:") {
        return Ok(url.to_owned());
    }

    let path = url.strip_prefix("file://").unwrap_or(url);
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::storage(format!("failed to read image {path}: {e}")))?;

    let mime = match path.rsplit('.').next() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:{mime};base64,{encoded}"))
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn display_name(&self) -> &'static str {
        "OpenAI-compatible"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        debug!("Sending chat completion request");

        let api_request = ApiRequest {
            model: model.to_owned(),
            messages: Self::convert_messages(request).await?,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then(|| json!({"type": "json_object"})),
        };

        let mut req = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Content-Type", "application/json")
            .json(&api_request);
        if let Some(key) = &self.config.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = req.send().await.map_err(|e| {
            error!("Failed to send request to completion API: {}", e);
            AppError::external_service("OpenAI", format!("Failed to connect: {e}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read completion API response: {}", e);
            AppError::external_service("OpenAI", format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let api_response: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse completion API response: {}", e);
            AppError::external_service("OpenAI", format!("Failed to parse response: {e}"))
        })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service("OpenAI", "API returned no choices"))?;

        let content = choice.message.content.unwrap_or_default();

        debug!(
            "Received completion: {} chars, finish_reason: {:?}",
            content.len(),
            choice.finish_reason
        );

        Ok(ChatResponse {
            content,
            model: api_response.model,
            usage: api_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: u.total,
            }),
            finish_reason: choice.finish_reason,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, AppError> {
        debug!("Performing completion API health check");

        let mut req = self.client.get(self.api_url("models"));
        if let Some(key) = &self.config.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = req.send().await.map_err(|e| {
            error!("Completion API health check failed: {}", e);
            AppError::external_service("OpenAI", format!("Health check failed: {e}"))
        })?;

        let healthy = response.status().is_success();
        if !healthy {
            warn!(
                "Completion API health check failed with status: {}",
                response.status()
            );
        }

        Ok(healthy)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    #[tokio::test]
    async fn test_image_attaches_to_last_user_message() {
        let request = ChatRequest::new(vec![
            ChatMessage::system("sys"),
            ChatMessage::user("look at this"),
        ])
        .with_image("data:image/png;base64,AAAA");

        let messages = OpenAiCompatibleProvider::convert_messages(&request)
            .await
            .unwrap();
        assert!(matches!(messages[0].content, ApiContent::Text(_)));
        match &messages[1].content {
            ApiContent::Parts(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[0], ContentPart::Text { .. }));
                assert!(matches!(parts[1], ContentPart::ImageUrl { .. }));
            }
            ApiContent::Text(_) => panic!("expected multimodal parts"),
        }
    }

    #[tokio::test]
    async fn test_text_only_request_stays_plain() {
        let request = ChatRequest::new(vec![ChatMessage::user("hello")]);
        let messages = OpenAiCompatibleProvider::convert_messages(&request)
            .await
            .unwrap();
        assert!(matches!(messages[0].content, ApiContent::Text(_)));
    }
}

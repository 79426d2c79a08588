// ABOUTME: Structured-completion client forcing JSON output and validating it at the boundary
// ABOUTME: Keeps "model didn't answer" and "model answered nonsense" as distinct errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Structured Completion Client
//!
//! Every AI call in the pipeline goes through this client to keep behavior
//! consistent: a fixed temperature/token budget per call site, forced
//! JSON-object output, and deserialization into a typed struct immediately at
//! the provider boundary.
//!
//! A provider that returns no content yields `AI_EMPTY_RESPONSE`; content that
//! fails JSON parsing or schema validation yields `AI_MALFORMED_OUTPUT`. The
//! two remain distinguishable all the way to the route layer.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use super::{ChatMessage, ChatRequest, LlmProvider};
use crate::errors::AppError;

/// Parameters for one structured completion call
#[derive(Debug, Clone)]
pub struct CompletionParams {
    /// System instruction
    pub system_prompt: String,
    /// User prompt
    pub user_prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens
    pub max_tokens: u32,
}

/// Client wrapping an [`LlmProvider`] with structured-output semantics
#[derive(Clone)]
pub struct StructuredClient {
    provider: Arc<dyn LlmProvider>,
}

impl StructuredClient {
    /// Create a client over the given provider
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Access the underlying provider
    #[must_use]
    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Call the provider and deserialize its JSON output into `T`
    ///
    /// # Errors
    ///
    /// - `AI_EMPTY_RESPONSE` when the provider returns no content
    /// - `AI_MALFORMED_OUTPUT` when the content fails parsing/validation
    /// - any transport error from the provider, unchanged
    pub async fn call<T: DeserializeOwned>(&self, params: &CompletionParams) -> Result<T, AppError> {
        self.execute(params, None).await
    }

    /// Vision variant: same contract, with one image attached to the user
    /// prompt as a low-detail content part.
    ///
    /// # Errors
    ///
    /// Same as [`Self::call`], plus `CONFIG_ERROR` when the provider does not
    /// support vision input.
    pub async fn call_vision<T: DeserializeOwned>(
        &self,
        params: &CompletionParams,
        image_url: &str,
    ) -> Result<T, AppError> {
        if !self.provider.capabilities().supports_vision() {
            return Err(AppError::config(format!(
                "provider {} does not support vision input",
                self.provider.name()
            )));
        }
        self.execute(params, Some(image_url)).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        params: &CompletionParams,
        image_url: Option<&str>,
    ) -> Result<T, AppError> {
        let mut request = ChatRequest::new(vec![
            ChatMessage::system(params.system_prompt.clone()),
            ChatMessage::user(params.user_prompt.clone()),
        ])
        .with_temperature(params.temperature)
        .with_max_tokens(params.max_tokens)
        .with_json_mode();

        if let Some(url) = image_url {
            request = request.with_image(url);
        }

        let response = self.provider.complete(&request).await?;

        if response.content.trim().is_empty() {
            return Err(AppError::ai_empty_response(self.provider.display_name()));
        }

        debug!(
            model = %response.model,
            chars = response.content.len(),
            "parsing structured completion"
        );

        serde_json::from_str(&response.content).map_err(|e| {
            AppError::ai_malformed_output(format!(
                "response failed schema validation: {e}"
            ))
            .with_source(e)
        })
    }
}

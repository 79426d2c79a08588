// ABOUTME: Replicate FLUX Kontext Pro image generator for physique previews
// ABOUTME: Normalizes heterogeneous response shapes and translates safety rejections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # FLUX Kontext Pro Generator
//!
//! Calls Replicate's prediction API with a physique-transformation prompt and
//! the source photo. Uses the synchronous-preference header and falls back to
//! polling when the prediction is still running.
//!
//! The prediction `output` field has taken several shapes across provider
//! versions (bare URL string, `{url: "..."}`, `{url: {href: "..."}}`). URL
//! extraction runs an ordered list of extractors and falls back to raw
//! stringification as a last resort.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument};
use url::Url;

use super::{GeneratorInput, GeneratorOutput, ImageGenerator};
use crate::errors::AppError;
use crate::models::ImageResultMetadata;
use crate::physique::prompt;

/// Environment variable for the Replicate API token
const REPLICATE_TOKEN_ENV: &str = "REPLICATE_API_TOKEN";

/// Default Replicate API base
const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";

/// Image model used for physique transformation
const MODEL: &str = "black-forest-labs/flux-kontext-pro";

/// Substrings that mark a provider-level safety rejection
const SAFETY_SIGNATURES: &[&str] = &["flagged as sensitive", "E005"];

/// User-facing guidance for a safety rejection. Photos without faces are
/// markedly less likely to be flagged.
const SAFETY_REJECTION_MESSAGE: &str = "Your photo was flagged by the image safety filter. \
     Try using a photo from the neck or chin down - photos without faces \
     are much less likely to be flagged.";

/// Prediction poll cadence and ceiling
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const POLL_TIMEOUT: Duration = Duration::from_secs(120);

/// Ordered output-URL extractors, tried in sequence
type Extractor = fn(&Value) -> Option<String>;
const URL_EXTRACTORS: &[Extractor] = &[
    // bare string
    |v| v.as_str().map(str::to_owned),
    // {url: "..."}
    |v| v.get("url").and_then(Value::as_str).map(str::to_owned),
    // {url: {href: "..."}}
    |v| {
        v.get("url")
            .and_then(|u| u.get("href"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    },
];

/// Extract an image URL from any of the known response shapes,
/// falling back to raw stringification.
fn extract_image_url(output: &Value) -> String {
    for extractor in URL_EXTRACTORS {
        if let Some(candidate) = extractor(output) {
            if Url::parse(&candidate).is_ok() {
                return candidate;
            }
        }
    }
    match output {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Check whether a provider error message is a safety rejection
fn is_safety_rejection(message: &str) -> bool {
    SAFETY_SIGNATURES.iter().any(|sig| message.contains(sig))
}

/// Map a provider error message into the domain error space
fn translate_provider_error(message: &str) -> AppError {
    if is_safety_rejection(message) {
        AppError::content_flagged(SAFETY_REJECTION_MESSAGE)
    } else {
        AppError::external_service("Replicate", message.to_owned())
    }
}

/// Image generator backed by Replicate's FLUX Kontext Pro model
pub struct FluxKontextGenerator {
    client: Client,
    api_base: String,
    api_token: String,
}

impl FluxKontextGenerator {
    /// Create a generator with an explicit API token
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: DEFAULT_API_BASE.to_owned(),
            api_token: api_token.into(),
        }
    }

    /// Create a generator from `REPLICATE_API_TOKEN`
    ///
    /// # Errors
    ///
    /// Returns an error if the token variable is not set.
    pub fn from_env() -> Result<Self, AppError> {
        let api_token = std::env::var(REPLICATE_TOKEN_ENV).map_err(|_| {
            AppError::config_missing(format!("Missing {REPLICATE_TOKEN_ENV} environment variable"))
        })?;
        Ok(Self::new(api_token))
    }

    /// Override the API base (test servers, proxies)
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    fn predictions_endpoint(&self) -> String {
        format!("{}/predictions", self.api_base)
    }

    /// Poll a running prediction until it settles or the ceiling passes
    async fn poll_prediction(&self, poll_url: &str) -> Result<Value, AppError> {
        let started = Instant::now();
        loop {
            let response = self
                .client
                .get(poll_url)
                .bearer_auth(&self.api_token)
                .send()
                .await
                .map_err(|e| {
                    AppError::external_service("Replicate", format!("poll failed: {e}"))
                })?;

            let payload: Value = response.json().await.map_err(|e| {
                AppError::external_service("Replicate", format!("poll parse failed: {e}"))
            })?;

            match payload.get("status").and_then(Value::as_str) {
                Some("succeeded") => return Ok(payload),
                Some("failed" | "canceled") => {
                    let detail = payload
                        .get("error")
                        .map_or_else(|| payload.to_string(), Value::to_string);
                    return Err(translate_provider_error(&detail));
                }
                _ => {}
            }

            if started.elapsed() >= POLL_TIMEOUT {
                return Err(AppError::external_service(
                    "Replicate",
                    format!("prediction timed out after {}s", POLL_TIMEOUT.as_secs()),
                ));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl ImageGenerator for FluxKontextGenerator {
    fn name(&self) -> &'static str {
        "flux-kontext"
    }

    #[instrument(skip(self, input), fields(scenario = input.scenario.as_str()))]
    async fn generate(&self, input: &GeneratorInput) -> Result<GeneratorOutput, AppError> {
        let start = Instant::now();

        let prompt = prompt::build_image_prompt(input);
        debug!(chars = prompt.len(), "built transformation prompt");

        let payload = json!({
            "model": MODEL,
            "input": {
                "prompt": prompt,
                "input_image": input.source_image_url,
                "safety_tolerance": 5,
                "output_format": "png",
                "aspect_ratio": "match_input_image",
            },
        });

        let response = self
            .client
            .post(self.predictions_endpoint())
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach Replicate: {}", e);
                AppError::external_service("Replicate", format!("Failed to connect: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::external_service("Replicate", format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(translate_provider_error(&body));
        }

        let mut prediction: Value = serde_json::from_str(&body).map_err(|e| {
            AppError::external_service("Replicate", format!("Failed to parse response: {e}"))
        })?;

        match prediction.get("status").and_then(Value::as_str) {
            Some("succeeded") => {}
            Some("starting" | "processing") => {
                let poll_url = prediction
                    .pointer("/urls/get")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .ok_or_else(|| {
                        AppError::external_service("Replicate", "prediction missing poll URL")
                    })?;
                prediction = self.poll_prediction(&poll_url).await?;
            }
            _ => {
                let detail = prediction
                    .get("error")
                    .map_or_else(|| prediction.to_string(), Value::to_string);
                return Err(translate_provider_error(&detail));
            }
        }

        let output = prediction.get("output").ok_or_else(|| {
            AppError::external_service("Replicate", "prediction returned no output")
        })?;
        let image_url = extract_image_url(output);

        Ok(GeneratorOutput {
            image_url,
            metadata: ImageResultMetadata {
                model: Some("flux-kontext-pro".to_owned()),
                processing_time_ms: Some(start.elapsed().as_millis() as u64),
                is_mock: false,
            },
        })
    }
}

// ABOUTME: Placeholder image generator for environments without provider credentials
// ABOUTME: Returns the source photo unchanged, tagged isMock so compositing is skipped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Mock generator used before real provider credentials are wired, and kept
//! available as a drop-in alternative for local development and tests.

use async_trait::async_trait;
use std::time::Instant;
use tracing::debug;

use super::{GeneratorInput, GeneratorOutput, ImageGenerator};
use crate::errors::AppError;
use crate::models::ImageResultMetadata;

/// Generator that echoes the source photo back as a "preview"
#[derive(Debug, Clone, Default)]
pub struct MockImageGenerator;

impl MockImageGenerator {
    /// Create a mock generator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, input: &GeneratorInput) -> Result<GeneratorOutput, AppError> {
        let start = Instant::now();
        debug!(
            scenario = input.scenario.as_str(),
            "returning mock physique preview"
        );

        Ok(GeneratorOutput {
            image_url: input.source_image_url.clone(),
            metadata: ImageResultMetadata {
                model: Some("mock-preview".to_owned()),
                processing_time_ms: Some(start.elapsed().as_millis() as u64),
                is_mock: true,
            },
        })
    }
}

// ABOUTME: Image generation SPI for physique transformation previews
// ABOUTME: Defines the generator contract plus the input/output value objects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Image Generator Service Provider Interface
//!
//! The physique pipeline needs exactly one image operation: transform a
//! source photo according to a natural-language prompt. This module defines
//! that contract; [`flux`] implements it against Replicate's FLUX Kontext
//! model and [`mock`] provides a credential-free placeholder that remains a
//! drop-in alternative.

mod flux;
mod mock;

pub use flux::FluxKontextGenerator;
pub use mock::MockImageGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{
    Equipment, ExperienceLevel, ImageResultMetadata, MuscleGroup, PhysiqueScenario,
    PhysiqueVisionAnalysis, TrainingGoal,
};

/// Profile subset the generator's prompt builder needs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorProfile {
    /// Training experience level
    pub experience_level: ExperienceLevel,
    /// Primary training goal
    pub goal: TrainingGoal,
    /// Training days per week
    pub days_per_week: u8,
    /// Equipment access
    pub equipment: Vec<Equipment>,
    /// Body weight in lbs, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Input bundle for one generation call
#[derive(Debug, Clone)]
pub struct GeneratorInput {
    /// Resolved URL of the source photo
    pub source_image_url: String,
    /// Simulation scenario
    pub scenario: PhysiqueScenario,
    /// Focus muscle for the single-muscle scenario
    pub focus_muscle: Option<MuscleGroup>,
    /// Profile subset
    pub profile: GeneratorProfile,
    /// Vision analysis grounding the prompt, when available
    pub vision_analysis: Option<PhysiqueVisionAnalysis>,
}

/// Result of one generation call
#[derive(Debug, Clone)]
pub struct GeneratorOutput {
    /// Resolved URL of the generated image
    pub image_url: String,
    /// Generation metadata
    pub metadata: ImageResultMetadata,
}

/// Contract for physique image generation
///
/// Each implementation must accept a source photo URL, return a transformed
/// image URL with processing metadata, and translate provider-specific
/// safety rejections into actionable errors.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Unique generator identifier
    fn name(&self) -> &'static str;

    /// Run one transformation
    async fn generate(&self, input: &GeneratorInput) -> Result<GeneratorOutput, AppError>;
}

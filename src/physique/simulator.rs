// ABOUTME: Orchestrator sequencing vision scan, parallel AI calls, composite, and assembly
// ABOUTME: The only step with local recovery is the face composite; everything else propagates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Analyze & Simulate Orchestrator
//!
//! Linear state machine, no branching back:
//!
//! 1. Resolve the stored photo into a time-limited download URL
//! 2. Vision scan (sequential: its output feeds both parallel branches)
//! 3. Fan-out: plan analysis and image generation run concurrently;
//!    either failure fails the whole operation
//! 4. Face composite, guarded: on any failure the uncomposited generated
//!    image is kept and the failure is logged
//! 5. Assemble the validated output object
//!
//! No external call is retried. Every invocation owns its inputs; nothing is
//! cached across requests.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::compositor::FaceCompositor;
use super::prompt;
use super::vision::run_vision_physique_scan;
use crate::errors::{AppError, AppResult};
use crate::imagegen::{GeneratorInput, GeneratorProfile, ImageGenerator};
use crate::llm::{CompletionParams, LlmProvider, StructuredClient};
use crate::models::{
    ImageResult, ImageResultType, MuscleGroup, PhotoType, PhysiqueAiOutput, PhysiqueScenario,
    PlanAnalysis, UserProfile, FITNESS_DISCLAIMERS,
};
use crate::storage::PhotoStorage;

/// Sampling temperature for the plan analysis
const ANALYSIS_TEMPERATURE: f32 = 0.6;
/// Token budget for the plan analysis
const ANALYSIS_MAX_TOKENS: u32 = 4096;

/// One simulation request, owned by a single invocation
#[derive(Debug, Clone)]
pub struct SimulationRequest {
    /// Requesting user
    pub user_id: Uuid,
    /// Storage key of the uploaded input photo
    pub photo_storage_key: String,
    /// Simulation scenario
    pub scenario: PhysiqueScenario,
    /// Focus muscle; required for the single-muscle scenario
    pub focus_muscle: Option<MuscleGroup>,
    /// The user's training profile
    pub profile: UserProfile,
}

/// The physique pipeline with its collaborators injected at construction
pub struct PhysiqueSimulator {
    ai: StructuredClient,
    generator: Arc<dyn ImageGenerator>,
    storage: Arc<dyn PhotoStorage>,
    compositor: FaceCompositor,
}

impl PhysiqueSimulator {
    /// Build a simulator over explicit provider instances.
    ///
    /// Clients are constructed once at process start and passed in; the
    /// pipeline reads no environment state after this point.
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        generator: Arc<dyn ImageGenerator>,
        storage: Arc<dyn PhotoStorage>,
    ) -> Self {
        Self {
            ai: StructuredClient::new(provider),
            generator,
            storage,
            compositor: FaceCompositor::new(),
        }
    }

    /// Run the full physique pipeline for one request.
    ///
    /// # Errors
    ///
    /// Propagates storage, transport, and AI-output errors unchanged; only
    /// the face-composite step recovers locally. Partial results are never
    /// returned.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, scenario = request.scenario.as_str()))]
    pub async fn analyze_and_simulate(
        &self,
        request: &SimulationRequest,
    ) -> AppResult<PhysiqueAiOutput> {
        request.profile.validate()?;
        if request.scenario == PhysiqueScenario::SingleMuscleFocus
            && request.focus_muscle.is_none()
        {
            return Err(AppError::invalid_input(
                "focusMuscle is required for the single_muscle_focus scenario",
            ));
        }

        // Step 1: resolve the stored photo into a short-lived URL
        let photo_url = self
            .storage
            .create_download_url(&request.photo_storage_key)
            .await?;

        // Step 2: vision scan; its output feeds both parallel branches
        let vision =
            run_vision_physique_scan(&self.ai, &photo_url, request.profile.experience_level)
                .await?;

        // Step 3: plan analysis and image generation, concurrently.
        // Either failure fails the whole operation.
        let analysis_params = CompletionParams {
            system_prompt: prompt::PHYSIQUE_SYSTEM_PROMPT.to_owned(),
            user_prompt: prompt::build_plan_user_prompt(
                &request.profile,
                request.scenario,
                request.focus_muscle,
                &vision,
            ),
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: ANALYSIS_MAX_TOKENS,
        };

        let generator_input = GeneratorInput {
            source_image_url: photo_url.clone(),
            scenario: request.scenario,
            focus_muscle: request.focus_muscle,
            profile: GeneratorProfile {
                experience_level: request.profile.experience_level,
                goal: request.profile.goal,
                days_per_week: request.profile.days_per_week,
                equipment: request.profile.equipment.clone(),
                weight: request.profile.weight,
            },
            vision_analysis: Some(vision.clone()),
        };

        let (analysis, image_result) = tokio::try_join!(
            self.ai.call::<PlanAnalysis>(&analysis_params),
            self.generator.generate(&generator_input),
        )?;

        // Step 4: composite the original face back onto the generated body.
        // faceEndPercent was already coerced numerically at the parse
        // boundary; 0 means "no face visible".
        let face_end = vision.face_end_percent;
        let mut final_image_url = image_result.image_url.clone();

        if face_end > 0.0 && !image_result.metadata.is_mock {
            match self
                .composite_and_store(
                    request.user_id,
                    &photo_url,
                    &image_result.image_url,
                    face_end,
                )
                .await
            {
                Ok(url) => final_image_url = url,
                Err(err) => {
                    warn!(error = %err, "face composite failed, returning raw generated image");
                }
            }
        }

        // Step 5: assemble the output contract
        let output = PhysiqueAiOutput {
            estimated_current: analysis.estimated_current,
            scenario: request.scenario,
            plan_update: analysis.plan_update,
            nutrition_targets: analysis.nutrition_targets,
            image_result: ImageResult {
                result_type: if image_result.metadata.is_mock {
                    ImageResultType::MockPreview
                } else {
                    ImageResultType::Generated
                },
                url: Some(final_image_url),
                metadata: image_result.metadata,
            },
            disclaimers: FITNESS_DISCLAIMERS.iter().map(|s| (*s).to_owned()).collect(),
            explanation: analysis.explanation,
        };

        info!(
            image_type = ?output.image_result.result_type,
            "physique simulation complete"
        );
        Ok(output)
    }

    /// Composite, upload the result, and resolve a fresh download URL
    async fn composite_and_store(
        &self,
        user_id: Uuid,
        original_url: &str,
        generated_url: &str,
        face_end_percent: f64,
    ) -> AppResult<String> {
        let png = self
            .compositor
            .composite_preserve_face(original_url, generated_url, face_end_percent)
            .await?;

        let storage_key = self
            .storage
            .upload_buffer(
                user_id,
                PhotoType::PhysiqueOutput,
                Bytes::from(png),
                "image/png",
            )
            .await?;

        self.storage.create_download_url(&storage_key).await
    }
}

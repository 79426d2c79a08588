// ABOUTME: Vision physique scan extracting a structured assessment from one photo
// ABOUTME: Grounds both the plan analysis and the image prompt, and locates the chin boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Vision Scan
//!
//! One multimodal AI call that reads the input photo into a
//! [`PhysiqueVisionAnalysis`]. Its `faceEndPercent` estimate tells the
//! compositor where to anchor the face-preservation boundary, so this scan
//! must run before anything else in the pipeline.

use tracing::{debug, instrument};

use super::prompt;
use crate::errors::AppResult;
use crate::llm::{CompletionParams, StructuredClient};
use crate::models::{ExperienceLevel, PhysiqueVisionAnalysis};

/// Sampling temperature for the scan; low, since the output is an assessment
const SCAN_TEMPERATURE: f32 = 0.3;
/// Token budget for the scan
const SCAN_MAX_TOKENS: u32 = 512;

/// Run the physique scan against a resolved photo URL.
///
/// Missing fields in the model's response degrade to empty values, and
/// `faceEndPercent` is coerced to a number even when the model returns a
/// numeric string.
///
/// # Errors
///
/// Propagates transport errors plus the `AI_EMPTY_RESPONSE` /
/// `AI_MALFORMED_OUTPUT` taxonomy of the structured client.
#[instrument(skip(ai, photo_url))]
pub async fn run_vision_physique_scan(
    ai: &StructuredClient,
    photo_url: &str,
    experience_level: ExperienceLevel,
) -> AppResult<PhysiqueVisionAnalysis> {
    let params = CompletionParams {
        system_prompt: prompt::VISION_SCAN_SYSTEM_PROMPT.to_owned(),
        user_prompt: prompt::build_vision_user_prompt(experience_level),
        temperature: SCAN_TEMPERATURE,
        max_tokens: SCAN_MAX_TOKENS,
    };

    let analysis: PhysiqueVisionAnalysis = ai.call_vision(&params, photo_url).await?;

    debug!(
        build_type = %analysis.build_type,
        face_end_percent = analysis.face_end_percent,
        opportunities = analysis.key_opportunities.len(),
        "vision scan complete"
    );

    Ok(analysis)
}

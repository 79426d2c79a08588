// ABOUTME: Shared test doubles for the physique pipeline integration tests
// ABOUTME: Scripted LLM provider and a static image generator, both trait-injected
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use physiq::errors::AppError;
use physiq::imagegen::{GeneratorInput, GeneratorOutput, ImageGenerator};
use physiq::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};
use physiq::models::ImageResultMetadata;

/// LLM provider that replays canned responses in order
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted test provider"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        "scripted-1"
    }

    async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let content = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted provider ran out of responses");
        Ok(ChatResponse {
            content,
            model: "scripted-1".to_owned(),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// Image generator that returns a fixed URL
pub struct StaticImageGenerator {
    pub image_url: String,
    pub is_mock: bool,
}

impl StaticImageGenerator {
    pub fn generated(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            is_mock: false,
        }
    }
}

#[async_trait]
impl ImageGenerator for StaticImageGenerator {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn generate(&self, _input: &GeneratorInput) -> Result<GeneratorOutput, AppError> {
        Ok(GeneratorOutput {
            image_url: self.image_url.clone(),
            metadata: ImageResultMetadata {
                model: Some("static-test".to_owned()),
                processing_time_ms: Some(1),
                is_mock: self.is_mock,
            },
        })
    }
}

/// Image generator that always fails with the given message
pub struct FailingImageGenerator {
    pub message: String,
}

#[async_trait]
impl ImageGenerator for FailingImageGenerator {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _input: &GeneratorInput) -> Result<GeneratorOutput, AppError> {
        Err(AppError::external_service("Replicate", self.message.clone()))
    }
}

/// A plausible vision-scan response
pub fn vision_json(face_end_percent: &str) -> String {
    format!(
        r#"{{
            "bodyFatRange": "18-21%",
            "buildType": "average",
            "muscleDevelopment": "moderate chest, underdeveloped back",
            "keyOpportunities": ["chest", "back", "shoulders", "arms"],
            "realisticChanges": "reduce body fat from ~20% to ~16%, add visible size to chest and shoulders",
            "facialHair": "light stubble",
            "faceEndPercent": {face_end_percent}
        }}"#
    )
}

/// A plausible, schema-complete plan-analysis response
pub fn plan_json() -> String {
    r#"{
        "estimatedCurrent": {
            "postureNotes": ["slight forward shoulder roll"],
            "muscleEmphasisOpportunities": ["upper chest", "lats"],
            "estimatedTrainingAge": "about 1 year"
        },
        "planUpdate": {
            "splitType": "push_pull_legs",
            "weeklySchedule": ["push", "pull", "legs", "rest", "push", "pull", "rest"],
            "keyExercises": [
                {
                    "name": "Incline Dumbbell Press",
                    "targetMuscle": "chest",
                    "sets": 4,
                    "repsRange": "8-12",
                    "priority": "high"
                }
            ],
            "progressionRules": ["add 2.5 lbs when all sets hit the top of the range"]
        },
        "nutritionTargets": {
            "calories": 2600,
            "proteinGrams": 180,
            "carbsGrams": 280,
            "fatGrams": 80,
            "notes": "slight surplus on training days"
        },
        "explanation": "A push/pull/legs split focused on chest and back development."
    }"#
    .to_owned()
}

/// Same plan response with nutritionTargets.calories removed
pub fn plan_json_missing_calories() -> String {
    plan_json().replace(r#""calories": 2600,"#, "")
}

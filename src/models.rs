// ABOUTME: Core domain types for profiles, physique analysis, and the AI output contract
// ABOUTME: Wire names are camelCase and bit-exact with the mobile client / persistence layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Domain Models
//!
//! Value objects that flow through the physique pipeline. Everything here is
//! transient and owned by a single request; persistence belongs to the route
//! layer, which stores the final [`PhysiqueAiOutput`] verbatim as an audit
//! record.
//!
//! The serde attributes on these types are part of the external contract:
//! the mobile client and the persistence layer both consume the exact JSON
//! key spelling produced here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::utils::lenient_f64;

// ============================================================================
// Constants
// ============================================================================

/// Fixed disclaimer strings attached to every AI result
pub const FITNESS_DISCLAIMERS: &[&str] = &[
    "This is AI-generated fitness guidance, not medical advice.",
    "Consult a healthcare professional before starting any new exercise program.",
    "Results vary based on genetics, consistency, nutrition, sleep, and other factors.",
    "The physique preview is an illustrative simulation, not a guaranteed outcome.",
    "We do not store, train on, or share your photos with third parties.",
];

/// Validity window for signed storage URLs (5 minutes)
pub const SIGNED_URL_EXPIRY_SECONDS: u64 = 300;

// ============================================================================
// Profile Enums
// ============================================================================

/// Training experience level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    /// Less than ~1 year of consistent training
    Beginner,
    /// 1-3 years of consistent training
    Intermediate,
    /// 3+ years of consistent training
    Advanced,
}

impl ExperienceLevel {
    /// Wire/prompt representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// Primary training goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingGoal {
    /// Muscle growth
    Hypertrophy,
    /// Maximal strength
    Strength,
    /// Fat loss while retaining muscle
    Cut,
}

impl TrainingGoal {
    /// Wire/prompt representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hypertrophy => "hypertrophy",
            Self::Strength => "strength",
            Self::Cut => "cut",
        }
    }
}

/// Equipment the user has access to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    /// Commercial gym with full equipment
    FullGym,
    /// Dumbbells at home
    HomeDumbbells,
    /// Barbell and plates at home
    HomeBarbell,
    /// No equipment
    BodyweightOnly,
    /// Resistance bands
    ResistanceBands,
}

impl Equipment {
    /// Wire/prompt representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FullGym => "full_gym",
            Self::HomeDumbbells => "home_dumbbells",
            Self::HomeBarbell => "home_barbell",
            Self::BodyweightOnly => "bodyweight_only",
            Self::ResistanceBands => "resistance_bands",
        }
    }
}

/// Muscle groups addressable by the single-muscle-focus scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuscleGroup {
    /// Pectorals
    Chest,
    /// Lats and mid-back
    Back,
    /// Deltoids
    Shoulders,
    /// Biceps
    Biceps,
    /// Triceps
    Triceps,
    /// Quadriceps
    Quads,
    /// Hamstrings
    Hamstrings,
    /// Glutes
    Glutes,
    /// Calves
    Calves,
    /// Abdominals
    Abs,
    /// Forearms
    Forearms,
    /// Trapezius
    Traps,
}

impl MuscleGroup {
    /// Wire/prompt representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chest => "chest",
            Self::Back => "back",
            Self::Shoulders => "shoulders",
            Self::Biceps => "biceps",
            Self::Triceps => "triceps",
            Self::Quads => "quads",
            Self::Hamstrings => "hamstrings",
            Self::Glutes => "glutes",
            Self::Calves => "calves",
            Self::Abs => "abs",
            Self::Forearms => "forearms",
            Self::Traps => "traps",
        }
    }
}

/// Physique-simulation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysiqueScenario {
    /// Full 3-month transformation preview
    #[serde(rename = "3_month_lock_in")]
    ThreeMonthLockIn,
    /// Single-muscle-focus preview
    #[serde(rename = "single_muscle_focus")]
    SingleMuscleFocus,
}

impl PhysiqueScenario {
    /// Wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ThreeMonthLockIn => "3_month_lock_in",
            Self::SingleMuscleFocus => "single_muscle_focus",
        }
    }
}

/// Photo asset classification in object storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoType {
    /// Progress photo uploaded by the user
    Progress,
    /// Input photo for the physique simulation
    PhysiqueInput,
    /// Generated/composited output of the physique simulation
    PhysiqueOutput,
}

impl PhotoType {
    /// Storage-key path segment
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Progress => "progress",
            Self::PhysiqueInput => "physique_input",
            Self::PhysiqueOutput => "physique_output",
        }
    }
}

// ============================================================================
// User Profile
// ============================================================================

/// Read-only training profile consumed by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Training experience level
    pub experience_level: ExperienceLevel,
    /// Primary training goal
    pub goal: TrainingGoal,
    /// Training days per week (2-7)
    pub days_per_week: u8,
    /// Equipment access (must be non-empty)
    pub equipment: Vec<Equipment>,
    /// Free-text injury notes
    #[serde(default)]
    pub injuries: Vec<String>,
    /// Body weight in lbs, when a recent metric exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl UserProfile {
    /// Validate the profile invariants before running the pipeline
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when equipment is empty or the weekly
    /// frequency is outside 2-7.
    pub fn validate(&self) -> AppResult<()> {
        if self.equipment.is_empty() {
            return Err(AppError::invalid_input("equipment must be non-empty"));
        }
        if !(2..=7).contains(&self.days_per_week) {
            return Err(AppError::invalid_input(format!(
                "daysPerWeek must be between 2 and 7, got {}",
                self.days_per_week
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Vision Analysis
// ============================================================================

/// Structured physique assessment extracted from a single photo
///
/// Produced once per request by the vision scan and consumed immediately by
/// the image generator's prompt builder and by the compositor. Every field is
/// defaulted so a sparse model response degrades to empty values instead of
/// failing the scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysiqueVisionAnalysis {
    /// Estimated body fat percentage range, e.g. "15-18%"
    #[serde(default)]
    pub body_fat_range: String,
    /// One of: slim, average, stocky, athletic, muscular
    #[serde(default)]
    pub build_type: String,
    /// Brief description of overall visible muscle development
    #[serde(default)]
    pub muscle_development: String,
    /// Top 3-4 muscle groups with most room for visible improvement
    #[serde(default)]
    pub key_opportunities: Vec<String>,
    /// Single-sentence realistic 3-month change narrative
    #[serde(default)]
    pub realistic_changes: String,
    /// Visible facial hair description, or "not visible"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facial_hair: Option<String>,
    /// Percentage from the top of the image at which the chin/jawline ends.
    /// The model sometimes returns this as a numeric string; it is coerced
    /// to a number with fallback 0.
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub face_end_percent: f64,
}

// ============================================================================
// Final AI Output
// ============================================================================

/// Posture and development read of the user's current state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedCurrent {
    /// Observations about posture
    pub posture_notes: Vec<String>,
    /// Muscle groups with emphasis opportunities
    pub muscle_emphasis_opportunities: Vec<String>,
    /// Free-text estimated training age
    pub estimated_training_age: String,
}

/// Priority of a recommended exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExercisePriority {
    /// Must-do movement
    High,
    /// Useful accessory
    Medium,
    /// Optional
    Low,
}

/// A single recommended exercise with prescription
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyExercise {
    /// Exercise name
    pub name: String,
    /// Primary muscle targeted
    pub target_muscle: String,
    /// Working sets per session
    pub sets: u32,
    /// Rep range, e.g. "8-12"
    pub reps_range: String,
    /// Priority tier
    pub priority: ExercisePriority,
}

/// Recommended plan update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanUpdate {
    /// Split type, e.g. "push_pull_legs"
    pub split_type: String,
    /// Day-by-day weekly schedule
    pub weekly_schedule: Vec<String>,
    /// Prioritized key exercises
    pub key_exercises: Vec<KeyExercise>,
    /// Progressive-overload rules
    pub progression_rules: Vec<String>,
}

/// Daily nutrition targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionTargets {
    /// Daily calories
    pub calories: f64,
    /// Daily protein in grams
    pub protein_grams: f64,
    /// Daily carbohydrates in grams
    pub carbs_grams: f64,
    /// Daily fat in grams
    pub fat_grams: f64,
    /// Free-text notes
    pub notes: String,
}

/// Whether the preview image came from the real generator or the placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageResultType {
    /// Placeholder produced without provider credentials
    MockPreview,
    /// Real AI-generated preview
    Generated,
}

/// Metadata describing how the preview image was produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResultMetadata {
    /// Model identifier used for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Wall-clock generation time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    /// True when the result is a non-AI placeholder
    pub is_mock: bool,
}

/// Final image envelope in the output contract
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    /// Result type tag
    #[serde(rename = "type")]
    pub result_type: ImageResultType,
    /// Resolved image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Generation metadata
    pub metadata: ImageResultMetadata,
}

/// The plan-analysis portion of the AI response, parsed straight off the
/// completion provider. A missing required field here (e.g.
/// `nutritionTargets.calories`) fails the whole request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAnalysis {
    /// Current-state assessment
    pub estimated_current: EstimatedCurrent,
    /// Recommended plan update
    pub plan_update: PlanUpdate,
    /// Nutrition targets
    pub nutrition_targets: NutritionTargets,
    /// User-friendly summary
    pub explanation: String,
}

/// Aggregate result of the physique pipeline
///
/// This is the one bit-exact external contract: the route layer persists it
/// verbatim and returns it to the mobile client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysiqueAiOutput {
    /// Current-state assessment
    pub estimated_current: EstimatedCurrent,
    /// Scenario the simulation ran under
    pub scenario: PhysiqueScenario,
    /// Recommended plan update
    pub plan_update: PlanUpdate,
    /// Nutrition targets
    pub nutrition_targets: NutritionTargets,
    /// Final image envelope
    pub image_result: ImageResult,
    /// Fixed disclaimer strings
    pub disclaimers: Vec<String>,
    /// User-friendly summary
    pub explanation: String,
}

// ============================================================================
// Photo Assets
// ============================================================================

/// A photo record as tracked by the (external) persistence layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoAsset {
    /// Asset ID
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Asset classification
    #[serde(rename = "type")]
    pub photo_type: PhotoType,
    /// Object storage key
    pub storage_key: String,
    /// Short-lived signed URL, when one has been issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_url: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

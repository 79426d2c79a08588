// ABOUTME: Pure prompt construction for the physique pipeline
// ABOUTME: Decision tables for intensity/style wording plus the system prompts for both AI calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Prompt Builder
//!
//! Deterministic derivation of natural-language instructions from structured
//! inputs. No I/O; everything here is a pure function over the profile and
//! vision analysis.

use crate::imagegen::GeneratorInput;
use crate::models::{
    Equipment, ExperienceLevel, MuscleGroup, PhysiqueScenario, PhysiqueVisionAnalysis,
    TrainingGoal, UserProfile,
};

/// Default opportunity areas when no vision analysis is available
const DEFAULT_AREAS: &str = "chest, shoulders, and arms";

/// Select the change-intensity qualifier from experience and frequency.
///
/// More training days plus less experience means more visible newbie gains;
/// advanced lifters always get the mildest wording.
#[must_use]
pub const fn intensity_qualifier(level: ExperienceLevel, days_per_week: u8) -> &'static str {
    match level {
        ExperienceLevel::Advanced => "slightly",
        ExperienceLevel::Beginner if days_per_week >= 5 => "noticeably",
        _ => "moderately",
    }
}

/// Select the physique-style phrase from equipment access.
///
/// First-match priority: full gym > home barbell > home dumbbells >
/// bodyweight only > default.
#[must_use]
pub fn physique_style(equipment: &[Equipment]) -> &'static str {
    if equipment.contains(&Equipment::FullGym) {
        "well-rounded muscular"
    } else if equipment.contains(&Equipment::HomeBarbell) {
        "strong and dense"
    } else if equipment.contains(&Equipment::HomeDumbbells) {
        "toned and defined"
    } else if equipment.contains(&Equipment::BodyweightOnly) {
        "lean and athletic"
    } else {
        "fit and toned"
    }
}

/// Build the goal-specific change description for the image prompt
#[must_use]
pub fn build_change_description(input: &GeneratorInput) -> String {
    let profile = &input.profile;
    let intensity = intensity_qualifier(profile.experience_level, profile.days_per_week);
    let style = physique_style(&profile.equipment);

    let areas = input.vision_analysis.as_ref().map_or_else(
        || DEFAULT_AREAS.to_owned(),
        |va| {
            va.key_opportunities
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        },
    );

    let only_body = "Only modify the body and physique, nothing else.";

    match profile.goal {
        TrainingGoal::Hypertrophy => format!(
            "Make this person's body {intensity} more muscular with more size in the {areas} and a {style} look. {only_body}"
        ),
        TrainingGoal::Cut => format!(
            "Make this person's body {intensity} leaner with more visible muscle definition, a tighter midsection, and less body fat with a {style} look. {only_body}"
        ),
        TrainingGoal::Strength => format!(
            "Make this person's body look {intensity} thicker and more solid with more mass in the {areas} and a {style} build. {only_body}"
        ),
    }
}

/// Build the identity-preservation clause
#[must_use]
pub fn build_identity_lock(vision: Option<&PhysiqueVisionAnalysis>) -> String {
    let facial_hair_desc = match vision.and_then(|va| va.facial_hair.as_deref()) {
        Some(hair) if hair != "not visible" => format!(
            "This person's facial hair is: {hair}. Keep their facial hair exactly the same."
        ),
        _ => "Preserve the person's exact facial hair (or lack thereof).".to_owned(),
    };

    format!(
        "{facial_hair_desc} \
         Keep the exact same hairstyle, hair color, skin tone, tattoos, scars, face, \
         expression, pose, clothing, and background. \
         The ONLY change should be to body musculature and body fat."
    )
}

/// Build the full image-transformation prompt for a generation call
#[must_use]
pub fn build_image_prompt(input: &GeneratorInput) -> String {
    let change_desc = build_change_description(input);
    let lock = build_identity_lock(input.vision_analysis.as_ref());

    match input.scenario {
        PhysiqueScenario::ThreeMonthLockIn => format!("{change_desc}. {lock}"),
        PhysiqueScenario::SingleMuscleFocus => {
            let focus = input.focus_muscle.map_or("muscles", |m| m.as_str());
            format!("Make the {focus} bigger and more defined. {change_desc}. {lock}")
        }
    }
}

// ============================================================================
// Vision Scan Prompt
// ============================================================================

/// System prompt for the single-photo physique scan
pub const VISION_SCAN_SYSTEM_PROMPT: &str = r#"You are an expert fitness coach and physique analyst. You will be shown a photo of a person. Analyze their current physique and output ONLY valid JSON matching this schema:

{
  "bodyFatRange": "string — estimated body fat percentage range, e.g. '15-18%'",
  "buildType": "string — one of: slim, average, stocky, athletic, muscular",
  "muscleDevelopment": "string — brief description of overall visible muscle development, e.g. 'moderate chest and arm development, underdeveloped back and shoulders'",
  "keyOpportunities": ["string — top 3-4 muscle groups with most room for visible improvement"],
  "realisticChanges": "string — a single detailed sentence describing what specific visible physical changes are realistically achievable in 3 months of perfect training and nutrition for this person's starting point. Be specific about body fat reduction ranges and which muscles would visibly grow.",
  "facialHair": "string — describe exactly what facial hair is visible: 'clean-shaven', 'light stubble', 'short beard', 'full beard', 'mustache only', etc. If the face is not visible, say 'not visible'.",
  "faceEndPercent": "number — estimate what percentage from the TOP of the image the person's chin/jawline ends at. For example, if the chin is roughly 1/4 down the image, return 25. If only the body is visible (no face), return 0. Must be 0-100."
}

RULES:
- Base everything on what you can actually see in the photo.
- Be realistic and encouraging. Do not exaggerate or understate.
- The realisticChanges field must describe concrete physical changes (e.g. 'reduce body fat from ~20% to ~16%, add visible size to chest and shoulders, tighten midsection'), not abstract goals.
- The facialHair field MUST accurately describe the person's current facial hair state. This is critical for identity preservation.
- The faceEndPercent field MUST be a number (not a string). Estimate where the chin ends as a percentage from the top of the image. This is used to preserve the face during image transformation.
- Output ONLY the JSON object, nothing else."#;

/// User prompt for the vision scan
#[must_use]
pub fn build_vision_user_prompt(experience_level: ExperienceLevel) -> String {
    format!(
        "Analyze this person's physique. They are a {} lifter. Provide your assessment as JSON.",
        experience_level.as_str()
    )
}

// ============================================================================
// Plan Analysis Prompt
// ============================================================================

/// System prompt for the text-based plan analysis
pub const PHYSIQUE_SYSTEM_PROMPT: &str = r#"You are the Physiq AI analyst, an expert at visual physique assessment and program design.

IMPORTANT DISCLAIMERS:
- You are NOT a medical professional.
- Your assessments are general fitness observations, not diagnoses.
- Always recommend consulting a healthcare professional for medical concerns.
- Physique previews are illustrative simulations, not guaranteed outcomes.

You analyze a user's current physique and create a targeted plan.
Use the provided vision analysis of their photo to ground your assessment.

RULES:
- Be encouraging and constructive.
- Focus on muscle development opportunities, not flaws.
- Provide realistic timeframe expectations.
- Output ONLY valid JSON.

OUTPUT JSON SCHEMA:
{
  "estimatedCurrent": {
    "postureNotes": ["string"],
    "muscleEmphasisOpportunities": ["string"],
    "estimatedTrainingAge": "string"
  },
  "planUpdate": {
    "splitType": "string",
    "weeklySchedule": ["string"],
    "keyExercises": [
      {
        "name": "string",
        "targetMuscle": "string",
        "sets": number,
        "repsRange": "string",
        "priority": "high | medium | low"
      }
    ],
    "progressionRules": ["string"]
  },
  "nutritionTargets": {
    "calories": number,
    "proteinGrams": number,
    "carbsGrams": number,
    "fatGrams": number,
    "notes": "string"
  },
  "explanation": "string - user-friendly summary"
}"#;

/// User prompt for the plan analysis, grounded in the vision scan
#[must_use]
pub fn build_plan_user_prompt(
    profile: &UserProfile,
    scenario: PhysiqueScenario,
    focus_muscle: Option<MuscleGroup>,
    vision: &PhysiqueVisionAnalysis,
) -> String {
    let injuries = if profile.injuries.is_empty() {
        "None".to_owned()
    } else {
        profile.injuries.join(", ")
    };

    let equipment = profile
        .equipment
        .iter()
        .map(Equipment::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let weight_line = profile
        .weight
        .map(|w| format!("- Weight: {w} lbs"))
        .unwrap_or_default();

    let scenario_desc = match scenario {
        PhysiqueScenario::ThreeMonthLockIn => {
            "3 months of full dedication (diet + training adherence)".to_owned()
        }
        PhysiqueScenario::SingleMuscleFocus => format!(
            "Focus on {} development",
            focus_muscle.map_or("muscles", |m| m.as_str())
        ),
    };

    let focus_line = focus_muscle
        .map(|m| format!("Focus muscle: {}", m.as_str()))
        .unwrap_or_default();

    format!(
        "Analyze this user and create a targeted plan:

User Profile:
- Experience: {experience}
- Goal: {goal}
- Training days/week: {days}
- Equipment: {equipment}
- Injuries: {injuries}
{weight_line}

Photo Analysis (from vision scan):
- Build type: {build_type}
- Estimated body fat: {body_fat}
- Muscle development: {development}
- Key opportunities: {opportunities}
- Realistic 3-month changes: {changes}

Scenario: {scenario_desc}
{focus_line}

Provide realistic assessment and a targeted plan for this scenario.
For the 3-month scenario, assume 100% adherence to training and nutrition.
For single muscle focus, optimize the program to prioritize that muscle while maintaining overall balance.
Use the photo analysis above to ground your recommendations in this person's actual starting point.",
        experience = profile.experience_level.as_str(),
        goal = profile.goal.as_str(),
        days = profile.days_per_week,
        build_type = vision.build_type,
        body_fat = vision.body_fat_range,
        development = vision.muscle_development,
        opportunities = vision.key_opportunities.join(", "),
        changes = vision.realistic_changes,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::imagegen::GeneratorProfile;

    fn profile(
        level: ExperienceLevel,
        goal: TrainingGoal,
        days: u8,
        equipment: Vec<Equipment>,
    ) -> GeneratorProfile {
        GeneratorProfile {
            experience_level: level,
            goal,
            days_per_week: days,
            equipment,
            weight: None,
        }
    }

    #[test]
    fn test_advanced_always_mildest() {
        for days in 2..=7 {
            assert_eq!(
                intensity_qualifier(ExperienceLevel::Advanced, days),
                "slightly"
            );
        }
    }

    #[test]
    fn test_beginner_high_frequency_strongest() {
        assert_eq!(
            intensity_qualifier(ExperienceLevel::Beginner, 5),
            "noticeably"
        );
        assert_eq!(
            intensity_qualifier(ExperienceLevel::Beginner, 7),
            "noticeably"
        );
    }

    #[test]
    fn test_everything_else_moderate() {
        assert_eq!(
            intensity_qualifier(ExperienceLevel::Beginner, 3),
            "moderately"
        );
        assert_eq!(
            intensity_qualifier(ExperienceLevel::Intermediate, 6),
            "moderately"
        );
        assert_eq!(
            intensity_qualifier(ExperienceLevel::Intermediate, 2),
            "moderately"
        );
    }

    #[test]
    fn test_style_priority_order() {
        // full_gym wins even when dumbbells are also present
        assert_eq!(
            physique_style(&[Equipment::HomeDumbbells, Equipment::FullGym]),
            "well-rounded muscular"
        );
        assert_eq!(
            physique_style(&[Equipment::BodyweightOnly, Equipment::HomeBarbell]),
            "strong and dense"
        );
        assert_eq!(
            physique_style(&[Equipment::ResistanceBands]),
            "fit and toned"
        );
    }

    #[test]
    fn test_change_description_defaults_without_vision() {
        let input = GeneratorInput {
            source_image_url: "https://example.com/p.png".to_owned(),
            scenario: PhysiqueScenario::ThreeMonthLockIn,
            focus_muscle: None,
            profile: profile(
                ExperienceLevel::Intermediate,
                TrainingGoal::Hypertrophy,
                4,
                vec![Equipment::FullGym],
            ),
            vision_analysis: None,
        };
        let desc = build_change_description(&input);
        assert!(desc.contains("chest, shoulders, and arms"));
        assert!(desc.contains("moderately"));
        assert!(desc.contains("well-rounded muscular"));
    }

    #[test]
    fn test_single_muscle_prefix() {
        let input = GeneratorInput {
            source_image_url: "https://example.com/p.png".to_owned(),
            scenario: PhysiqueScenario::SingleMuscleFocus,
            focus_muscle: Some(MuscleGroup::Shoulders),
            profile: profile(
                ExperienceLevel::Beginner,
                TrainingGoal::Strength,
                3,
                vec![Equipment::HomeBarbell],
            ),
            vision_analysis: None,
        };
        let prompt = build_image_prompt(&input);
        assert!(prompt.starts_with("Make the shoulders bigger and more defined."));
    }

    #[test]
    fn test_identity_lock_uses_visible_facial_hair() {
        let va = PhysiqueVisionAnalysis {
            facial_hair: Some("short beard".to_owned()),
            ..PhysiqueVisionAnalysis::default()
        };
        let lock = build_identity_lock(Some(&va));
        assert!(lock.contains("This person's facial hair is: short beard."));

        let hidden = PhysiqueVisionAnalysis {
            facial_hair: Some("not visible".to_owned()),
            ..PhysiqueVisionAnalysis::default()
        };
        let lock = build_identity_lock(Some(&hidden));
        assert!(lock.contains("Preserve the person's exact facial hair"));
    }
}

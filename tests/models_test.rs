// ABOUTME: Wire-contract tests for the output schema and vision analysis parsing
// ABOUTME: Pins exact JSON key spelling consumed by the mobile client and persistence layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{plan_json, plan_json_missing_calories};
use physiq::models::{
    EstimatedCurrent, ExercisePriority, ImageResult, ImageResultMetadata, ImageResultType,
    KeyExercise, NutritionTargets, PhysiqueAiOutput, PhysiqueScenario, PhysiqueVisionAnalysis,
    PlanAnalysis, PlanUpdate, FITNESS_DISCLAIMERS,
};

fn sample_output() -> PhysiqueAiOutput {
    PhysiqueAiOutput {
        estimated_current: EstimatedCurrent {
            posture_notes: vec!["slight anterior pelvic tilt".to_owned()],
            muscle_emphasis_opportunities: vec!["upper chest".to_owned()],
            estimated_training_age: "about 1 year".to_owned(),
        },
        scenario: PhysiqueScenario::ThreeMonthLockIn,
        plan_update: PlanUpdate {
            split_type: "push_pull_legs".to_owned(),
            weekly_schedule: vec!["push".to_owned(), "pull".to_owned()],
            key_exercises: vec![KeyExercise {
                name: "Incline Dumbbell Press".to_owned(),
                target_muscle: "chest".to_owned(),
                sets: 4,
                reps_range: "8-12".to_owned(),
                priority: ExercisePriority::High,
            }],
            progression_rules: vec!["add 2.5 lbs when all sets hit the top".to_owned()],
        },
        nutrition_targets: NutritionTargets {
            calories: 2600.0,
            protein_grams: 180.0,
            carbs_grams: 280.0,
            fat_grams: 80.0,
            notes: "slight surplus".to_owned(),
        },
        image_result: ImageResult {
            result_type: ImageResultType::Generated,
            url: Some("https://cdn.example.com/out.png".to_owned()),
            metadata: ImageResultMetadata {
                model: Some("flux-kontext-pro".to_owned()),
                processing_time_ms: Some(4200),
                is_mock: false,
            },
        },
        disclaimers: FITNESS_DISCLAIMERS.iter().map(|s| (*s).to_owned()).collect(),
        explanation: "A plan focused on chest and back.".to_owned(),
    }
}

#[test]
fn test_output_top_level_keys_are_exact() {
    let value = serde_json::to_value(sample_output()).unwrap();
    let object = value.as_object().unwrap();

    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "disclaimers",
            "estimatedCurrent",
            "explanation",
            "imageResult",
            "nutritionTargets",
            "planUpdate",
            "scenario",
        ]
    );
}

#[test]
fn test_output_nested_keys_are_exact() {
    let value = serde_json::to_value(sample_output()).unwrap();

    assert!(value.pointer("/estimatedCurrent/postureNotes").is_some());
    assert!(value
        .pointer("/estimatedCurrent/muscleEmphasisOpportunities")
        .is_some());
    assert!(value
        .pointer("/estimatedCurrent/estimatedTrainingAge")
        .is_some());

    assert!(value.pointer("/planUpdate/splitType").is_some());
    assert!(value.pointer("/planUpdate/weeklySchedule").is_some());
    assert!(value.pointer("/planUpdate/keyExercises/0/targetMuscle").is_some());
    assert!(value.pointer("/planUpdate/keyExercises/0/repsRange").is_some());
    assert_eq!(
        value.pointer("/planUpdate/keyExercises/0/priority").and_then(|v| v.as_str()),
        Some("high")
    );
    assert!(value.pointer("/planUpdate/progressionRules").is_some());

    assert_eq!(
        value.pointer("/nutritionTargets/calories").and_then(serde_json::Value::as_f64),
        Some(2600.0)
    );
    assert!(value.pointer("/nutritionTargets/proteinGrams").is_some());
    assert!(value.pointer("/nutritionTargets/carbsGrams").is_some());
    assert!(value.pointer("/nutritionTargets/fatGrams").is_some());

    assert_eq!(
        value.pointer("/scenario").and_then(|v| v.as_str()),
        Some("3_month_lock_in")
    );
    assert_eq!(
        value.pointer("/imageResult/type").and_then(|v| v.as_str()),
        Some("generated")
    );
    assert_eq!(
        value.pointer("/imageResult/metadata/isMock").and_then(serde_json::Value::as_bool),
        Some(false)
    );
    assert_eq!(
        value
            .pointer("/imageResult/metadata/processingTimeMs")
            .and_then(serde_json::Value::as_u64),
        Some(4200)
    );
}

#[test]
fn test_output_round_trips() {
    let output = sample_output();
    let json = serde_json::to_string(&output).unwrap();
    let restored: PhysiqueAiOutput = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.scenario, output.scenario);
    assert_eq!(restored.disclaimers, output.disclaimers);
    assert_eq!(
        restored.nutrition_targets.calories,
        output.nutrition_targets.calories
    );
}

#[test]
fn test_plan_analysis_parses_complete_response() {
    let analysis: PlanAnalysis = serde_json::from_str(&plan_json()).unwrap();
    assert_eq!(analysis.nutrition_targets.calories, 2600.0);
    assert_eq!(analysis.plan_update.key_exercises.len(), 1);
    assert_eq!(
        analysis.plan_update.key_exercises[0].priority,
        ExercisePriority::High
    );
}

#[test]
fn test_plan_analysis_rejects_missing_calories() {
    let err = serde_json::from_str::<PlanAnalysis>(&plan_json_missing_calories()).unwrap_err();
    assert!(err.to_string().contains("calories"));
}

#[test]
fn test_plan_analysis_ignores_extra_fields() {
    // Models frequently add commentary fields; they must not break parsing
    let mut value: serde_json::Value = serde_json::from_str(&plan_json()).unwrap();
    value["confidence"] = serde_json::json!("high");
    let analysis: PlanAnalysis = serde_json::from_value(value).unwrap();
    assert_eq!(analysis.nutrition_targets.protein_grams, 180.0);
}

#[test]
fn test_vision_analysis_accepts_sparse_and_string_numbers() {
    let sparse: PhysiqueVisionAnalysis = serde_json::from_str("{}").unwrap();
    assert_eq!(sparse.face_end_percent, 0.0);
    assert!(sparse.facial_hair.is_none());

    let stringy: PhysiqueVisionAnalysis =
        serde_json::from_str(r#"{"faceEndPercent": "42.5", "buildType": "athletic"}"#).unwrap();
    assert_eq!(stringy.face_end_percent, 42.5);
    assert_eq!(stringy.build_type, "athletic");
}

#[test]
fn test_disclaimers_are_the_fixed_five() {
    assert_eq!(FITNESS_DISCLAIMERS.len(), 5);
    assert!(FITNESS_DISCLAIMERS[0].contains("not medical advice"));
    assert!(FITNESS_DISCLAIMERS[3].contains("illustrative simulation"));
}

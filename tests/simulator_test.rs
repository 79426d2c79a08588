// ABOUTME: End-to-end tests of the analyze-and-simulate orchestrator with injected fakes
// ABOUTME: Covers the happy path, the composite fallback, and the error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use uuid::Uuid;

use common::{
    plan_json, plan_json_missing_calories, vision_json, FailingImageGenerator, ScriptedProvider,
    StaticImageGenerator,
};
use physiq::errors::ErrorCode;
use physiq::imagegen::MockImageGenerator;
use physiq::models::{
    Equipment, ExperienceLevel, ImageResultType, MuscleGroup, PhotoType, PhysiqueScenario,
    TrainingGoal, UserProfile,
};
use physiq::physique::{PhysiqueSimulator, SimulationRequest};
use physiq::storage::{LocalPhotoStorage, PhotoStorage};

fn profile() -> UserProfile {
    UserProfile {
        experience_level: ExperienceLevel::Beginner,
        goal: TrainingGoal::Hypertrophy,
        days_per_week: 5,
        equipment: vec![Equipment::FullGym],
        injuries: vec![],
        weight: Some(176.0),
    }
}

/// Encode a solid-color PNG
fn png_bytes(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(px));
    let mut out = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut out),
        image::ImageFormat::Png,
    )
    .unwrap();
    out
}

struct Setup {
    storage: Arc<LocalPhotoStorage>,
    user_id: Uuid,
    photo_storage_key: String,
    _dir: tempfile::TempDir,
}

/// Stage an original photo in a fresh local store
async fn setup_storage() -> Setup {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(LocalPhotoStorage::new(dir.path()));
    let user_id = Uuid::new_v4();
    let photo_storage_key = storage
        .upload_buffer(
            user_id,
            PhotoType::PhysiqueInput,
            png_bytes(10, 100, [200, 100, 50, 255]).into(),
            "image/png",
        )
        .await
        .unwrap();
    Setup {
        storage,
        user_id,
        photo_storage_key,
        _dir: dir,
    }
}

fn request(setup: &Setup) -> SimulationRequest {
    SimulationRequest {
        user_id: setup.user_id,
        photo_storage_key: setup.photo_storage_key.clone(),
        scenario: PhysiqueScenario::ThreeMonthLockIn,
        focus_muscle: None,
        profile: profile(),
    }
}

#[tokio::test]
async fn test_happy_path_composites_and_stores_output() {
    let setup = setup_storage().await;

    // Stage a "generated" image the static generator will point at
    let generated_key = setup
        .storage
        .upload_buffer(
            setup.user_id,
            PhotoType::PhysiqueOutput,
            png_bytes(10, 100, [10, 20, 30, 255]).into(),
            "image/png",
        )
        .await
        .unwrap();
    let generated_url = setup
        .storage
        .create_download_url(&generated_key)
        .await
        .unwrap();

    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![vision_json("25"), plan_json()])),
        Arc::new(StaticImageGenerator::generated(generated_url.clone())),
        setup.storage.clone(),
    );

    let output = simulator.analyze_and_simulate(&request(&setup)).await.unwrap();

    assert_eq!(output.scenario, PhysiqueScenario::ThreeMonthLockIn);
    assert_eq!(output.image_result.result_type, ImageResultType::Generated);
    assert_eq!(output.disclaimers.len(), 5);
    assert_eq!(output.nutrition_targets.calories, 2600.0);

    // The composite succeeded, so the final URL is a fresh physique_output
    // object, not the generator's URL
    let final_url = output.image_result.url.unwrap();
    assert_ne!(final_url, generated_url);
    assert!(final_url.contains("physique_output"));

    // The stored composite keeps the original dimensions and the original
    // pixels above the chin line (chin 25, solid 30 for height 100)
    let composite_path = final_url.strip_prefix("file://").unwrap();
    let composite = image::open(composite_path).unwrap().to_rgba8();
    assert_eq!(composite.dimensions(), (10, 100));
    assert_eq!(composite.get_pixel(5, 0), &image::Rgba([200, 100, 50, 255]));
    assert_eq!(composite.get_pixel(5, 99), &image::Rgba([10, 20, 30, 255]));
}

#[tokio::test]
async fn test_composite_failure_falls_back_to_generated_url() {
    let setup = setup_storage().await;

    // The generated URL is unreadable, so the composite fails and the
    // pipeline keeps the uncomposited image
    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![vision_json("25"), plan_json()])),
        Arc::new(StaticImageGenerator::generated("file:///nonexistent/gen.png")),
        setup.storage.clone(),
    );

    let output = simulator.analyze_and_simulate(&request(&setup)).await.unwrap();
    assert_eq!(
        output.image_result.url.as_deref(),
        Some("file:///nonexistent/gen.png")
    );
    assert_eq!(output.image_result.result_type, ImageResultType::Generated);
}

#[tokio::test]
async fn test_face_end_zero_skips_composite() {
    let setup = setup_storage().await;

    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![vision_json("0"), plan_json()])),
        Arc::new(StaticImageGenerator::generated("file:///unused/gen.png")),
        setup.storage.clone(),
    );

    let output = simulator.analyze_and_simulate(&request(&setup)).await.unwrap();
    assert_eq!(
        output.image_result.url.as_deref(),
        Some("file:///unused/gen.png")
    );
}

#[tokio::test]
async fn test_string_face_end_percent_is_coerced() {
    let setup = setup_storage().await;

    // faceEndPercent arrives as a JSON string; coercion must still
    // enable the composite path (which here fails and falls back, proving
    // it was attempted rather than skipped as "0")
    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![
            vision_json("\"25\""),
            plan_json(),
        ])),
        Arc::new(StaticImageGenerator::generated("file:///nonexistent/gen.png")),
        setup.storage.clone(),
    );

    let output = simulator.analyze_and_simulate(&request(&setup)).await.unwrap();
    assert!(output.image_result.url.is_some());
}

#[tokio::test]
async fn test_mock_generator_skips_composite_and_tags_result() {
    let setup = setup_storage().await;

    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![vision_json("25"), plan_json()])),
        Arc::new(MockImageGenerator::new()),
        setup.storage.clone(),
    );

    let output = simulator.analyze_and_simulate(&request(&setup)).await.unwrap();
    assert_eq!(
        output.image_result.result_type,
        ImageResultType::MockPreview
    );
    assert!(output.image_result.metadata.is_mock);
    // The mock echoes the source photo URL
    assert!(output.image_result.url.unwrap().contains("physique_input"));
}

#[tokio::test]
async fn test_missing_calories_fails_whole_request() {
    let setup = setup_storage().await;

    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![
            vision_json("25"),
            plan_json_missing_calories(),
        ])),
        Arc::new(MockImageGenerator::new()),
        setup.storage.clone(),
    );

    let err = simulator
        .analyze_and_simulate(&request(&setup))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AiMalformedOutput);
}

#[tokio::test]
async fn test_empty_plan_response_is_distinct_failure() {
    let setup = setup_storage().await;

    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![vision_json("25"), String::new()])),
        Arc::new(MockImageGenerator::new()),
        setup.storage.clone(),
    );

    let err = simulator
        .analyze_and_simulate(&request(&setup))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AiEmptyResponse);
}

#[tokio::test]
async fn test_generator_failure_fails_whole_request() {
    let setup = setup_storage().await;

    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![vision_json("25"), plan_json()])),
        Arc::new(FailingImageGenerator {
            message: "boom".to_owned(),
        }),
        setup.storage.clone(),
    );

    let err = simulator
        .analyze_and_simulate(&request(&setup))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceError);
}

#[tokio::test]
async fn test_missing_photo_fails_before_any_ai_call() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(LocalPhotoStorage::new(dir.path()));

    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![])),
        Arc::new(MockImageGenerator::new()),
        storage,
    );

    let request = SimulationRequest {
        user_id: Uuid::new_v4(),
        photo_storage_key: "missing/physique_input/void.png".to_owned(),
        scenario: PhysiqueScenario::ThreeMonthLockIn,
        focus_muscle: None,
        profile: profile(),
    };

    let err = simulator.analyze_and_simulate(&request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_single_muscle_scenario_requires_focus() {
    let setup = setup_storage().await;

    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![])),
        Arc::new(MockImageGenerator::new()),
        setup.storage.clone(),
    );

    let mut req = request(&setup);
    req.scenario = PhysiqueScenario::SingleMuscleFocus;
    req.focus_muscle = None;

    let err = simulator.analyze_and_simulate(&req).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    req.focus_muscle = Some(MuscleGroup::Shoulders);
    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![vision_json("25"), plan_json()])),
        Arc::new(MockImageGenerator::new()),
        setup.storage.clone(),
    );
    assert!(simulator.analyze_and_simulate(&req).await.is_ok());
}

#[tokio::test]
async fn test_invalid_profile_rejected() {
    let setup = setup_storage().await;

    let simulator = PhysiqueSimulator::new(
        Arc::new(ScriptedProvider::new(vec![])),
        Arc::new(MockImageGenerator::new()),
        setup.storage.clone(),
    );

    let mut req = request(&setup);
    req.profile.equipment.clear();
    let err = simulator.analyze_and_simulate(&req).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

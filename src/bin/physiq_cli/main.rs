// ABOUTME: Physiq CLI - run the physique pipeline against a local photo
// ABOUTME: Stores the photo locally, runs analyze-and-simulate, prints the output JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
//!
//! Usage:
//! ```bash
//! # Full 3-month preview with a real image provider
//! OPENAI_API_KEY=... REPLICATE_API_TOKEN=... \
//!   physiq-cli --photo ./me.jpg --experience beginner --goal hypertrophy \
//!     --days 5 --equipment full-gym
//!
//! # Single-muscle preview; without REPLICATE_API_TOKEN the mock generator is used
//! OPENAI_API_KEY=... physiq-cli --photo ./me.jpg --experience intermediate \
//!   --goal cut --days 4 --equipment home-dumbbells --scenario single-muscle-focus \
//!   --focus-muscle shoulders
//! ```

use clap::{Parser, ValueEnum};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use physiq::config::AppConfig;
use physiq::errors::{AppError, AppResult};
use physiq::imagegen::{FluxKontextGenerator, ImageGenerator, MockImageGenerator};
use physiq::llm::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};
use physiq::logging::LoggingConfig;
use physiq::models::{
    Equipment, ExperienceLevel, MuscleGroup, PhotoType, PhysiqueScenario, TrainingGoal,
    UserProfile,
};
use physiq::moderation;
use physiq::physique::{PhysiqueSimulator, SimulationRequest};
use physiq::storage::{LocalPhotoStorage, PhotoStorage};

#[derive(Parser)]
#[command(
    name = "physiq-cli",
    about = "Physiq physique simulation CLI",
    long_about = "Runs the full physique pipeline (vision scan, plan analysis, image \
                  generation, face-preserving composite) against a local photo."
)]
struct Cli {
    /// Path to the input photo (jpeg/png/webp)
    #[arg(long)]
    photo: String,

    /// Training experience level
    #[arg(long, value_enum)]
    experience: ExperienceArg,

    /// Training goal
    #[arg(long, value_enum)]
    goal: GoalArg,

    /// Training days per week (2-7)
    #[arg(long)]
    days: u8,

    /// Equipment access (repeatable)
    #[arg(long, value_enum, required = true)]
    equipment: Vec<EquipmentArg>,

    /// Injury notes (repeatable)
    #[arg(long)]
    injury: Vec<String>,

    /// Body weight in lbs
    #[arg(long)]
    weight: Option<f64>,

    /// Simulation scenario
    #[arg(long, value_enum, default_value = "3-month-lock-in")]
    scenario: ScenarioArg,

    /// Focus muscle (required for single-muscle-focus)
    #[arg(long, value_enum)]
    focus_muscle: Option<MuscleArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExperienceArg {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Clone, Copy, ValueEnum)]
enum GoalArg {
    Hypertrophy,
    Strength,
    Cut,
}

#[derive(Clone, Copy, ValueEnum)]
enum EquipmentArg {
    FullGym,
    HomeDumbbells,
    HomeBarbell,
    BodyweightOnly,
    ResistanceBands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScenarioArg {
    #[value(name = "3-month-lock-in")]
    ThreeMonthLockIn,
    SingleMuscleFocus,
}

#[derive(Clone, Copy, ValueEnum)]
enum MuscleArg {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Abs,
    Forearms,
    Traps,
}

impl From<ExperienceArg> for ExperienceLevel {
    fn from(arg: ExperienceArg) -> Self {
        match arg {
            ExperienceArg::Beginner => Self::Beginner,
            ExperienceArg::Intermediate => Self::Intermediate,
            ExperienceArg::Advanced => Self::Advanced,
        }
    }
}

impl From<GoalArg> for TrainingGoal {
    fn from(arg: GoalArg) -> Self {
        match arg {
            GoalArg::Hypertrophy => Self::Hypertrophy,
            GoalArg::Strength => Self::Strength,
            GoalArg::Cut => Self::Cut,
        }
    }
}

impl From<EquipmentArg> for Equipment {
    fn from(arg: EquipmentArg) -> Self {
        match arg {
            EquipmentArg::FullGym => Self::FullGym,
            EquipmentArg::HomeDumbbells => Self::HomeDumbbells,
            EquipmentArg::HomeBarbell => Self::HomeBarbell,
            EquipmentArg::BodyweightOnly => Self::BodyweightOnly,
            EquipmentArg::ResistanceBands => Self::ResistanceBands,
        }
    }
}

impl From<ScenarioArg> for PhysiqueScenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::ThreeMonthLockIn => Self::ThreeMonthLockIn,
            ScenarioArg::SingleMuscleFocus => Self::SingleMuscleFocus,
        }
    }
}

impl From<MuscleArg> for MuscleGroup {
    fn from(arg: MuscleArg) -> Self {
        match arg {
            MuscleArg::Chest => Self::Chest,
            MuscleArg::Back => Self::Back,
            MuscleArg::Shoulders => Self::Shoulders,
            MuscleArg::Biceps => Self::Biceps,
            MuscleArg::Triceps => Self::Triceps,
            MuscleArg::Quads => Self::Quads,
            MuscleArg::Hamstrings => Self::Hamstrings,
            MuscleArg::Glutes => Self::Glutes,
            MuscleArg::Calves => Self::Calves,
            MuscleArg::Abs => Self::Abs,
            MuscleArg::Forearms => Self::Forearms,
            MuscleArg::Traps => Self::Traps,
        }
    }
}

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    LoggingConfig::from_env()
        .init()
        .map_err(|e| AppError::config(format!("failed to initialize logging: {e}")))?;

    let config = AppConfig::from_env()?;

    let provider = Arc::new(OpenAiCompatibleProvider::new(OpenAiCompatibleConfig {
        base_url: config.llm.base_url.clone(),
        api_key: Some(config.llm.api_key.clone()),
        default_model: config.llm.model.clone(),
    }));

    let generator: Arc<dyn ImageGenerator> = match &config.image {
        Some(image) => Arc::new(FluxKontextGenerator::new(image.api_token.clone())),
        None => {
            info!("REPLICATE_API_TOKEN not set, using the mock image generator");
            Arc::new(MockImageGenerator::new())
        }
    };

    let storage = Arc::new(LocalPhotoStorage::new(config.storage.root.clone()));

    // Stage the input photo into local storage the way the upload route would
    let content_type = content_type_for(&cli.photo);
    if !moderation::validate_content_type(content_type) {
        return Err(AppError::invalid_input(format!(
            "unsupported photo content type: {content_type}"
        )));
    }

    let bytes = tokio::fs::read(&cli.photo)
        .await
        .map_err(|e| AppError::invalid_input(format!("cannot read photo {}: {e}", cli.photo)))?;
    if !moderation::validate_file_size(bytes.len() as u64) {
        return Err(AppError::invalid_input("photo exceeds the 10 MB size cap"));
    }

    let user_id = Uuid::new_v4();
    let photo_storage_key = storage
        .upload_buffer(
            user_id,
            PhotoType::PhysiqueInput,
            bytes.into(),
            content_type,
        )
        .await?;

    info!(key = %photo_storage_key, "staged input photo");

    let simulator = PhysiqueSimulator::new(provider, generator, storage);

    let request = SimulationRequest {
        user_id,
        photo_storage_key,
        scenario: cli.scenario.into(),
        focus_muscle: cli.focus_muscle.map(Into::into),
        profile: UserProfile {
            experience_level: cli.experience.into(),
            goal: cli.goal.into(),
            days_per_week: cli.days,
            equipment: cli.equipment.into_iter().map(Into::into).collect(),
            injuries: cli.injury,
            weight: cli.weight,
        },
    };

    let output = simulator.analyze_and_simulate(&request).await?;

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| AppError::internal(format!("failed to serialize output: {e}")))?;
    println!("{json}");

    Ok(())
}

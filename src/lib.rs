// ABOUTME: Main library entry point for the Physiq physique simulation engine
// ABOUTME: Wires the AI pipeline modules behind a trait-injected orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Physiq
//!
//! The physique-transformation engine behind the Physiq fitness app: one
//! orchestrated pipeline that turns a user's photo and training profile into
//! a periodization/nutrition plan and a face-preserving physique preview.
//!
//! ## Pipeline
//!
//! 1. **Vision scan** - a multimodal AI call extracts a structured physique
//!    assessment (and the chin boundary) from the photo
//! 2. **Fan-out** - the plan analysis and the image generation run
//!    concurrently, both grounded in the vision output
//! 3. **Composite** - the original face is blended back over the generated
//!    body with a vertical weighted gradient
//! 4. **Assembly** - the validated output object the route layer persists
//!    verbatim
//!
//! ## Architecture
//!
//! - **`llm`**: completion provider SPI plus the structured-output client
//! - **`imagegen`**: image generator SPI (Replicate FLUX Kontext + mock)
//! - **`storage`**: photo storage SPI (filesystem implementation included)
//! - **`physique`**: prompts, vision scan, compositor, orchestrator
//!
//! Provider clients are constructed once at process start and injected into
//! [`physique::PhysiqueSimulator`]; the pipeline holds no global state.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use physiq::imagegen::MockImageGenerator;
//! use physiq::llm::OpenAiCompatibleProvider;
//! use physiq::physique::PhysiqueSimulator;
//! use physiq::storage::LocalPhotoStorage;
//!
//! # fn main() -> physiq::errors::AppResult<()> {
//! let simulator = PhysiqueSimulator::new(
//!     Arc::new(OpenAiCompatibleProvider::from_env()?),
//!     Arc::new(MockImageGenerator::new()),
//!     Arc::new(LocalPhotoStorage::new("./data/photos")),
//! );
//! # Ok(())
//! # }
//! ```

/// Environment-driven application configuration
pub mod config;

/// Unified error handling with stable error codes
pub mod errors;

/// Image generation SPI and providers
pub mod imagegen;

/// LLM provider SPI and the structured-completion client
pub mod llm;

/// Logging configuration and subscriber setup
pub mod logging;

/// Upload content moderation checks
pub mod moderation;

/// Core domain models and the output contract
pub mod models;

/// The physique transformation pipeline
pub mod physique;

/// Photo storage SPI and the filesystem implementation
pub mod storage;

/// Shared parsing helpers for untrusted model output
pub mod utils;

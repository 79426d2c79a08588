// ABOUTME: Environment-driven application configuration
// ABOUTME: Aggregates LLM, image-generation, and storage settings read once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Configuration
//!
//! Environment-only configuration, read once at process start. Provider
//! clients are constructed from this and injected into the pipeline; no
//! module reads environment variables afterwards.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `OPENAI_API_KEY` | completion provider key | required |
//! | `OPENAI_BASE_URL` | completion endpoint base | `https://api.openai.com/v1` |
//! | `OPENAI_MODEL` | completion model | `gpt-4o` |
//! | `REPLICATE_API_TOKEN` | image provider token | optional (mock generator without it) |
//! | `PHYSIQ_STORAGE_ROOT` | local photo storage root | `./data/photos` |

use std::env;
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};

/// Completion provider settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Endpoint base URL
    pub base_url: String,
    /// Bearer token
    pub api_key: String,
    /// Default model
    pub model: String,
}

/// Image-generation provider settings
#[derive(Debug, Clone)]
pub struct ImageGenConfig {
    /// Replicate API token
    pub api_token: String,
}

/// Photo storage settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for the local store
    pub root: PathBuf,
}

/// Aggregated application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Completion provider settings
    pub llm: LlmConfig,
    /// Image provider settings; absent means "use the mock generator"
    pub image: Option<ImageGenConfig>,
    /// Storage settings
    pub storage: StorageConfig,
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_MISSING` when `OPENAI_API_KEY` is absent. A missing
    /// Replicate token is not an error; the image section is simply `None`.
    pub fn from_env() -> AppResult<Self> {
        let api_key = non_empty_env("OPENAI_API_KEY").ok_or_else(|| {
            AppError::config_missing("Missing OPENAI_API_KEY environment variable")
        })?;

        let llm = LlmConfig {
            base_url: non_empty_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_owned())
                .trim_end_matches('/')
                .to_owned(),
            api_key,
            model: non_empty_env("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_owned()),
        };

        let image = non_empty_env("REPLICATE_API_TOKEN").map(|api_token| ImageGenConfig { api_token });

        let storage = StorageConfig {
            root: non_empty_env("PHYSIQ_STORAGE_ROOT")
                .map_or_else(|| PathBuf::from("./data/photos"), PathBuf::from),
        };

        Ok(Self {
            llm,
            image,
            storage,
        })
    }
}

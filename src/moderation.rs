// ABOUTME: Upload content checks - content type, file size, age verification
// ABOUTME: Image classification is a metadata-only MVP behind a stable contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Content Moderation
//!
//! Basic checks applied before a photo enters the physique pipeline. The
//! image-content check currently validates metadata only; swapping in a real
//! moderation backend (vision-model classification, a cloud moderation API)
//! keeps the same [`ModerationResult`] contract.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Allowed upload content types
const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Maximum upload size
const MAX_FILE_SIZE_MB: u64 = 10;

/// Outcome of a moderation check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResult {
    /// Whether the content may proceed
    pub approved: bool,
    /// Rejection reasons, empty when approved
    pub reasons: Vec<String>,
    /// Confidence of the verdict; low values mark metadata-only checks
    pub confidence: f64,
}

/// Check whether an upload content type is acceptable
#[must_use]
pub fn validate_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES.contains(&content_type)
}

/// Check whether an upload size is within the cap
#[must_use]
pub const fn validate_file_size(size_bytes: u64) -> bool {
    size_bytes <= MAX_FILE_SIZE_MB * 1024 * 1024
}

/// Result of an age verification check
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeCheck {
    /// Whether the user is at least 18
    pub is_over_18: bool,
    /// Computed calendar age
    pub age: i32,
}

/// Compute calendar age from a date of birth and verify the 18+ requirement
#[must_use]
pub fn verify_age(date_of_birth: NaiveDate) -> AgeCheck {
    let today = Utc::now().date_naive();

    let mut age = today.year() - date_of_birth.year();
    let birthday_passed = (today.month(), today.day()) >= (date_of_birth.month(), date_of_birth.day());
    if !birthday_passed {
        age -= 1;
    }

    AgeCheck {
        is_over_18: age >= 18,
        age,
    }
}

/// Classify the image content behind a storage URL.
///
/// MVP: passes everything that cleared the metadata checks, with a low
/// confidence to mark the verdict as basic. A production deployment replaces
/// this body with a vision-model or moderation-API call and keeps the
/// contract.
pub async fn check_image_content(_image_url: &str) -> ModerationResult {
    ModerationResult {
        approved: true,
        reasons: Vec::new(),
        confidence: 0.5,
    }
}

// ABOUTME: Face-preserving pixel compositor blending the original photo onto the generated body
// ABOUTME: Three-zone vertical blend anchored at the vision scan's chin estimate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Face-Preserving Compositor
//!
//! Produces a single image that is the original photo above the subject's
//! chin line and the AI-generated body below it. Identity cues are never
//! altered by the generative model even when the model ignored the
//! preservation instructions in its prompt.
//!
//! The blend uses three zones: fully original down to a safety margin below
//! the estimated chin, a linear fade band, then fully generated. A hard
//! cutoff at the exact chin estimate would visibly seam whenever the vision
//! estimate is slightly off; the margin plus fade keeps the seam
//! imperceptible without pixel-perfect face detection.

use image::imageops::FilterType;
use image::{ImageFormat, RgbaImage};
use reqwest::Client;
use std::io::Cursor;
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// Inclusive range of plausible chin estimates, in percent of image height
pub const FACE_END_MIN_PERCENT: f64 = 5.0;
/// Upper bound of plausible chin estimates
pub const FACE_END_MAX_PERCENT: f64 = 70.0;
/// Fallback used when the vision model returns a nonsensical estimate
pub const FACE_END_FALLBACK_PERCENT: f64 = 30.0;

/// Safety margin kept fully original below the chin, as a height fraction
const SOLID_MARGIN_FRACTION: f64 = 0.05;
/// Height fraction of the linear blend band
const FADE_BAND_FRACTION: f64 = 0.06;

/// Clamp a chin estimate to the plausible range.
///
/// Any out-of-range value - including 0, negatives, NaN, or implausibly
/// large numbers - is replaced with the fixed fallback so a misbehaving
/// vision model cannot produce an almost-entirely-original or
/// almost-entirely-generated composite.
#[must_use]
pub fn clamp_face_end_percent(face_end_percent: f64) -> f64 {
    if (FACE_END_MIN_PERCENT..=FACE_END_MAX_PERCENT).contains(&face_end_percent) {
        face_end_percent
    } else {
        FACE_END_FALLBACK_PERCENT
    }
}

/// Row boundaries of the three blend zones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendBoundaries {
    /// Estimated chin row
    pub chin_px: u32,
    /// Last row of the fully-original zone
    pub solid_end: u32,
    /// First row of the fully-generated zone
    pub fade_end: u32,
}

/// Compute the blend boundaries for a clamped chin estimate and image height
#[must_use]
pub fn blend_boundaries(face_end_percent: f64, height: u32) -> BlendBoundaries {
    let pct = clamp_face_end_percent(face_end_percent);
    let h = f64::from(height);

    let chin_px = (pct / 100.0 * h).round() as u32;
    let solid_end = height.min(chin_px + (h * SOLID_MARGIN_FRACTION).round() as u32);
    let fade_end = height.min(solid_end + (h * FADE_BAND_FRACTION).round() as u32);

    BlendBoundaries {
        chin_px,
        solid_end,
        fade_end,
    }
}

/// Origin weight for one row: 1.0 = fully original, 0.0 = fully generated
#[must_use]
pub fn origin_weight(y: u32, bounds: &BlendBoundaries) -> f64 {
    if y <= bounds.solid_end {
        1.0
    } else if y >= bounds.fade_end {
        0.0
    } else {
        1.0 - f64::from(y - bounds.solid_end) / f64::from(bounds.fade_end - bounds.solid_end)
    }
}

/// Blend two same-dimension RGBA buffers row by row.
///
/// Rows with weight 1.0 or 0.0 are copied verbatim from the respective
/// source (no floating-point rounding on the fast paths). Blended rows mix
/// each of R, G, B as `round(orig*w + gen*(1-w))` and force alpha opaque.
#[must_use]
pub fn blend_rgba(
    original: &[u8],
    generated: &[u8],
    width: u32,
    height: u32,
    bounds: &BlendBoundaries,
) -> Vec<u8> {
    let row_len = width as usize * 4;
    let mut out = vec![0u8; original.len()];

    for y in 0..height {
        let row_start = y as usize * row_len;
        let row_end = row_start + row_len;
        let w = origin_weight(y, bounds);

        if w == 1.0 {
            out[row_start..row_end].copy_from_slice(&original[row_start..row_end]);
        } else if w == 0.0 {
            out[row_start..row_end].copy_from_slice(&generated[row_start..row_end]);
        } else {
            let g = 1.0 - w;
            for x in 0..width as usize {
                let i = row_start + x * 4;
                out[i] = (f64::from(original[i]) * w + f64::from(generated[i]) * g).round() as u8;
                out[i + 1] =
                    (f64::from(original[i + 1]) * w + f64::from(generated[i + 1]) * g).round() as u8;
                out[i + 2] =
                    (f64::from(original[i + 2]) * w + f64::from(generated[i + 2]) * g).round() as u8;
                out[i + 3] = 255;
            }
        }
    }

    out
}

/// Compositor that fetches, blends, and re-encodes the two source images
#[derive(Debug, Clone, Default)]
pub struct FaceCompositor {
    client: Client,
}

impl FaceCompositor {
    /// Create a compositor with a fresh HTTP client
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a compositor sharing an existing HTTP client
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch raw image bytes from an `http(s)://` or `file://` URL
    async fn fetch_image_bytes(&self, url: &str) -> AppResult<Vec<u8>> {
        if let Some(path) = url.strip_prefix("file://") {
            return tokio::fs::read(path)
                .await
                .map_err(|e| AppError::storage(format!("failed to read image {path}: {e}")));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::external_service("image fetch", e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::external_service(
                "image fetch",
                format!("failed to fetch image: {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::external_service("image fetch", e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Produce a PNG that preserves the original face above the chin line
    /// and adopts the generated body below it.
    ///
    /// The generated image is resampled to the original's exact dimensions
    /// first, since the provider's output may differ in size.
    ///
    /// # Errors
    ///
    /// Fetch, decode, and encode failures all surface as errors; the
    /// orchestrator recovers from them by keeping the uncomposited image.
    pub async fn composite_preserve_face(
        &self,
        original_url: &str,
        generated_url: &str,
        face_end_percent: f64,
    ) -> AppResult<Vec<u8>> {
        let (orig_bytes, gen_bytes) = tokio::try_join!(
            self.fetch_image_bytes(original_url),
            self.fetch_image_bytes(generated_url),
        )?;

        let orig = image::load_from_memory(&orig_bytes)
            .map_err(|e| AppError::internal(format!("failed to decode original image: {e}")))?
            .to_rgba8();
        let (width, height) = orig.dimensions();

        let gen = image::load_from_memory(&gen_bytes)
            .map_err(|e| AppError::internal(format!("failed to decode generated image: {e}")))?
            .to_rgba8();
        let gen = if gen.dimensions() == (width, height) {
            gen
        } else {
            image::imageops::resize(&gen, width, height, FilterType::Lanczos3)
        };

        let bounds = blend_boundaries(face_end_percent, height);
        debug!(
            width,
            height,
            chin_px = bounds.chin_px,
            solid_end = bounds.solid_end,
            fade_end = bounds.fade_end,
            "compositing face-preserved output"
        );

        let blended = blend_rgba(orig.as_raw(), gen.as_raw(), width, height, &bounds);

        let out = RgbaImage::from_raw(width, height, blended)
            .ok_or_else(|| AppError::internal("blended buffer has wrong length"))?;

        let mut png = Vec::new();
        out.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| AppError::internal(format!("failed to encode composite: {e}")))?;
        Ok(png)
    }
}

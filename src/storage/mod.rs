// ABOUTME: Photo storage abstraction over signed-URL object storage
// ABOUTME: Defines the trait the pipeline uses to read input photos and persist outputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Photo Storage
//!
//! The pipeline treats object storage as a collaborator with a narrow
//! contract: issue a time-limited download URL for a stored photo, and accept
//! an uploaded buffer under a new key. Production deployments put an
//! S3-compatible service behind this trait; [`local`] ships a
//! filesystem-backed implementation for development and the CLI.
//!
//! Storage keys follow `{userId}/{photoType}/{uuid}` so per-user cleanup is a
//! prefix operation.

mod local;

pub use local::LocalPhotoStorage;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::PhotoType;

/// A signed upload grant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    /// URL the client PUTs the photo to
    pub upload_url: String,
    /// Key the object will live under
    pub storage_key: String,
    /// Grant validity in seconds
    pub expires_in: u64,
}

/// Build a storage key for a new photo
#[must_use]
pub fn new_storage_key(user_id: Uuid, photo_type: PhotoType, extension: &str) -> String {
    format!(
        "{user_id}/{}/{}.{extension}",
        photo_type.as_str(),
        Uuid::new_v4()
    )
}

/// Map an upload content type onto a file extension
#[must_use]
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

/// Contract for photo object storage
///
/// Must be callable multiple times per request: once to read the input
/// photo, once to write the composited output.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Issue a signed URL a client can upload a photo to
    async fn create_upload_url(
        &self,
        user_id: Uuid,
        photo_type: PhotoType,
        content_type: &str,
    ) -> AppResult<UploadTicket>;

    /// Issue a time-limited download URL for a stored photo
    async fn create_download_url(&self, storage_key: &str) -> AppResult<String>;

    /// Store a buffer under a fresh key, returning that key
    async fn upload_buffer(
        &self,
        user_id: Uuid,
        photo_type: PhotoType,
        bytes: Bytes,
        content_type: &str,
    ) -> AppResult<String>;

    /// Delete a stored photo
    async fn delete_object(&self, storage_key: &str) -> AppResult<()>;
}

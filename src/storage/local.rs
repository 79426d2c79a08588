// ABOUTME: Filesystem-backed photo storage for development and the CLI
// ABOUTME: Issues file:// URLs in place of signed object-storage URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Filesystem implementation of [`PhotoStorage`]. Keys map directly onto
//! paths under a root directory; "signed" URLs are `file://` URLs, which the
//! rest of the pipeline (LLM image attachment, compositor fetch) accepts.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::{extension_for_content_type, new_storage_key, PhotoStorage, UploadTicket};
use crate::errors::{AppError, AppResult};
use crate::models::{PhotoType, SIGNED_URL_EXPIRY_SECONDS};

/// Photo storage rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalPhotoStorage {
    root: PathBuf,
}

impl LocalPhotoStorage {
    /// Create a store rooted at `root` (created lazily on first write)
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, storage_key: &str) -> AppResult<PathBuf> {
        // Keys are generated internally, but reject traversal anyway
        if storage_key.split('/').any(|part| part == "..") {
            return Err(AppError::invalid_input("storage key must not traverse"));
        }
        Ok(self.root.join(storage_key))
    }

    fn file_url(path: &Path) -> AppResult<String> {
        let absolute = path
            .canonicalize()
            .map_err(|e| AppError::storage(format!("cannot resolve {}: {e}", path.display())))?;
        Url::from_file_path(&absolute)
            .map(String::from)
            .map_err(|()| AppError::storage(format!("not an absolute path: {}", path.display())))
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn create_upload_url(
        &self,
        user_id: Uuid,
        photo_type: PhotoType,
        content_type: &str,
    ) -> AppResult<UploadTicket> {
        let key = new_storage_key(user_id, photo_type, extension_for_content_type(content_type));
        let path = self.path_for(&key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage(format!("mkdir failed: {e}")))?;
        }
        // The file does not exist yet, so build the URL from the parent
        let parent_url = path
            .parent()
            .map(Self::file_url)
            .transpose()?
            .unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(UploadTicket {
            upload_url: format!("{parent_url}/{file_name}"),
            storage_key: key,
            expires_in: SIGNED_URL_EXPIRY_SECONDS,
        })
    }

    async fn create_download_url(&self, storage_key: &str) -> AppResult<String> {
        let path = self.path_for(storage_key)?;
        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| AppError::storage(format!("stat failed: {e}")))?
        {
            return Err(AppError::not_found(format!("photo {storage_key}")));
        }
        Self::file_url(&path)
    }

    async fn upload_buffer(
        &self,
        user_id: Uuid,
        photo_type: PhotoType,
        bytes: Bytes,
        content_type: &str,
    ) -> AppResult<String> {
        let key = new_storage_key(user_id, photo_type, extension_for_content_type(content_type));
        let path = self.path_for(&key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage(format!("mkdir failed: {e}")))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::storage(format!("write failed: {e}")))?;

        debug!(key = %key, bytes = bytes.len(), "stored photo locally");
        Ok(key)
    }

    async fn delete_object(&self, storage_key: &str) -> AppResult<()> {
        let path = self.path_for(storage_key)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| AppError::storage(format!("delete failed: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_download_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalPhotoStorage::new(dir.path());
        let user = Uuid::new_v4();

        let key = storage
            .upload_buffer(
                user,
                PhotoType::PhysiqueInput,
                Bytes::from_static(b"not really a png"),
                "image/png",
            )
            .await
            .unwrap();

        let url = storage.create_download_url(&key).await.unwrap();
        assert!(url.starts_with("file://"));

        let path = url.strip_prefix("file://").unwrap();
        let stored = std::fs::read(path).unwrap();
        assert_eq!(stored, b"not really a png");

        storage.delete_object(&key).await.unwrap();
        assert!(storage.create_download_url(&key).await.is_err());
    }

    #[tokio::test]
    async fn test_download_of_missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalPhotoStorage::new(dir.path());
        let err = storage
            .create_download_url("nope/progress/missing.png")
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::ResourceNotFound);
    }

    #[tokio::test]
    async fn test_traversal_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalPhotoStorage::new(dir.path());
        assert!(storage.create_download_url("../etc/passwd").await.is_err());
    }
}

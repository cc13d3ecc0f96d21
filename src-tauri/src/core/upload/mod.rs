//! Upload Orchestration
//!
//! Composes the gateway calls into the two-stage upload flow: obtain a
//! signed URL + file id, then PUT the bytes straight to storage. Strictly
//! sequential; each stage is reported through the progress callback before
//! it starts. A failure at any stage aborts the whole operation — an issued
//! but unused signed URL simply expires on the backend side.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use specta::Type;
use tracing::info;

use crate::core::api::MaskingProvider;
use crate::core::files::{content_type_for, validate_video_file};
use crate::core::{CoreError, CoreResult, FileId};

// =============================================================================
// Stages
// =============================================================================

/// Coarse-grained upload stage reported to the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    GettingUploadUrl,
    UploadingToStorage,
    Completed,
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadStage::GettingUploadUrl => write!(f, "Getting upload URL..."),
            UploadStage::UploadingToStorage => write!(f, "Uploading to cloud storage..."),
            UploadStage::Completed => write!(f, "Upload completed!"),
        }
    }
}

// =============================================================================
// Request / Result
// =============================================================================

/// A local file staged for upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    /// Stages a file, inferring the MIME type from the name
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes,
        }
    }
}

/// Outcome of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// Opaque handle the backend uses to locate the stored object
    pub file_id: FileId,
    pub message: String,
}

// =============================================================================
// VideoUploader
// =============================================================================

/// Orchestrates the two-stage upload flow
pub struct VideoUploader {
    provider: Arc<dyn MaskingProvider>,
}

impl VideoUploader {
    pub fn new(provider: Arc<dyn MaskingProvider>) -> Self {
        Self { provider }
    }

    /// Uploads a staged file. Validation runs first; a rejected file never
    /// touches the network.
    pub async fn upload<F>(
        &self,
        request: UploadRequest,
        mut on_progress: F,
    ) -> CoreResult<UploadResult>
    where
        F: FnMut(UploadStage),
    {
        validate_video_file(&request.file_name, request.bytes.len() as u64)?;

        on_progress(UploadStage::GettingUploadUrl);
        let ticket = self.provider.get_upload_url().await?;

        on_progress(UploadStage::UploadingToStorage);
        self.provider
            .upload_bytes(&ticket.upload_url, &request.content_type, request.bytes)
            .await?;

        on_progress(UploadStage::Completed);
        info!(file_id = %ticket.file_id, file = %request.file_name, "Video uploaded");

        Ok(UploadResult {
            file_id: ticket.file_id,
            message: "Video uploaded successfully".to_string(),
        })
    }

    /// Uploads a file from disk. Size is validated against metadata before
    /// the file is read into memory.
    pub async fn upload_path<F>(&self, path: &Path, on_progress: F) -> CoreResult<UploadResult>
    where
        F: FnMut(UploadStage),
    {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                CoreError::ValidationError(format!("Invalid file path: {}", path.display()))
            })?
            .to_string();

        let metadata = tokio::fs::metadata(path).await?;
        validate_video_file(&file_name, metadata.len())?;

        let bytes = tokio::fs::read(path).await?;
        self.upload(UploadRequest::new(file_name, bytes), on_progress)
            .await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::MockMaskingProvider;
    use crate::core::files::MAX_UPLOAD_BYTES;

    #[test]
    fn test_stage_strings() {
        assert_eq!(
            UploadStage::GettingUploadUrl.to_string(),
            "Getting upload URL..."
        );
        assert_eq!(
            UploadStage::UploadingToStorage.to_string(),
            "Uploading to cloud storage..."
        );
        assert_eq!(UploadStage::Completed.to_string(), "Upload completed!");
    }

    #[test]
    fn test_request_infers_content_type() {
        let request = UploadRequest::new("clip.mov", vec![1, 2, 3]);
        assert_eq!(request.content_type, "video/quicktime");
    }

    #[tokio::test]
    async fn test_upload_happy_path_reports_stages_in_order() {
        let mock = Arc::new(MockMaskingProvider::new().with_file_id("f-42"));
        let uploader = VideoUploader::new(mock.clone());

        let mut stages = Vec::new();
        let result = uploader
            .upload(UploadRequest::new("clip.mp4", vec![0u8; 16]), |stage| {
                stages.push(stage)
            })
            .await
            .unwrap();

        assert_eq!(result.file_id, "f-42");
        assert_eq!(result.message, "Video uploaded successfully");
        assert_eq!(
            stages,
            vec![
                UploadStage::GettingUploadUrl,
                UploadStage::UploadingToStorage,
                UploadStage::Completed,
            ]
        );
        assert_eq!(mock.upload_url_calls(), 1);
        assert_eq!(mock.upload_calls(), 1);
    }

    #[tokio::test]
    async fn test_rejected_extension_makes_no_network_call() {
        let mock = Arc::new(MockMaskingProvider::new());
        let uploader = VideoUploader::new(mock.clone());

        let err = uploader
            .upload(UploadRequest::new("notes.txt", vec![0u8; 16]), |_| {})
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(mock.upload_url_calls(), 0);
        assert_eq!(mock.upload_calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_locally() {
        let mock = Arc::new(MockMaskingProvider::new());
        let uploader = VideoUploader::new(mock.clone());

        // Declared size at the limit; no need to allocate 500MB.
        let request = UploadRequest {
            file_name: "big.mp4".to_string(),
            content_type: "video/mp4".to_string(),
            bytes: Vec::new(),
        };
        let err = validate_video_file(&request.file_name, MAX_UPLOAD_BYTES).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(mock.upload_url_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_aborts_before_completion() {
        let mock = Arc::new(MockMaskingProvider::new().with_upload_failure("storage said no"));
        let uploader = VideoUploader::new(mock.clone());

        let mut stages = Vec::new();
        let err = uploader
            .upload(UploadRequest::new("clip.mp4", vec![0u8; 16]), |stage| {
                stages.push(stage)
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("storage said no"));
        // The completion stage is never reported on failure.
        assert_eq!(
            stages,
            vec![UploadStage::GettingUploadUrl, UploadStage::UploadingToStorage]
        );
    }

    #[tokio::test]
    async fn test_upload_url_failure_aborts_whole_operation() {
        let mock = Arc::new(MockMaskingProvider::new().with_upload_url_failure("quota exceeded"));
        let uploader = VideoUploader::new(mock.clone());

        let err = uploader
            .upload(UploadRequest::new("clip.mp4", vec![0u8; 16]), |_| {})
            .await
            .unwrap_err();

        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(mock.upload_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_path_reads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.mp4");
        tokio::fs::write(&path, b"fake mp4 bytes").await.unwrap();

        let mock = Arc::new(MockMaskingProvider::new().with_file_id("f-path"));
        let uploader = VideoUploader::new(mock.clone());

        let result = uploader.upload_path(&path, |_| {}).await.unwrap();
        assert_eq!(result.file_id, "f-path");
        assert_eq!(mock.upload_calls(), 1);

        // Wrong extension on disk is still rejected locally.
        let bad = dir.path().join("sample.txt");
        tokio::fs::write(&bad, b"text").await.unwrap();
        let err = uploader.upload_path(&bad, |_| {}).await.unwrap_err();
        assert!(err.is_validation());
    }
}

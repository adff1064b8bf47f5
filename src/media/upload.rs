//! Resize-then-upload flow over an external storage collaborator.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{report, ImageFile, ImagePipeline, ProgressObserver, UploadType};
use crate::error::{UploadError, UploadResult};

/// Error type returned by storage collaborators.
pub type StorageError = Box<dyn std::error::Error + Send + Sync>;

/// Storage backend that persists image bytes and hands back a public URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Store `file` at `path`. `progress` receives the upload's own 0.0-1.0
    /// progress.
    async fn upload(
        &self,
        path: &str,
        file: &ImageFile,
        progress: &dyn ProgressObserver,
    ) -> Result<String, StorageError>;
}

/// Destination and preset for one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Folder inside the bucket, e.g. "avatars/<user id>"
    pub path: String,
    pub upload_type: UploadType,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Full storage path the bytes were written to
    pub path: String,
    /// Public URL returned by storage
    pub url: String,
    /// Uploaded size in bytes
    pub size: u64,
}

/// Build `<dir>/<millis>-<name>`, replacing characters outside
/// `[A-Za-z0-9.-]` in the file name with `_`.
pub fn storage_path(dir: &str, file_name: &str, timestamp_millis: i64) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{dir}/{timestamp_millis}-{sanitized}")
}

impl ImagePipeline {
    /// Resize an image with its upload preset and hand it to `uploader`.
    ///
    /// Resizing accounts for the first half of the reported progress and the
    /// upload for the second. If the preset output is still above the
    /// aggressive threshold, the aggressive ladder is run on the original.
    pub async fn upload<U>(
        &self,
        file: &ImageFile,
        request: &UploadRequest,
        uploader: &U,
        progress: Option<&dyn ProgressObserver>,
    ) -> UploadResult<UploadedImage>
    where
        U: ImageUploader + ?Sized,
    {
        if !file.is_image() {
            return Err(UploadError::NotAnImage(file.mime_type.clone()));
        }

        let options = request.upload_type.resize_options();
        let resize_progress = |p: f32| report(progress, p * 0.5);
        let mut resized = self.resize(file, &options, Some(&resize_progress)).await?;

        if resized.len() as u64 > self.config.aggressive_threshold_bytes {
            warn!(
                size = resized.len(),
                threshold = self.config.aggressive_threshold_bytes,
                "still too large after preset resize, using aggressive resize"
            );
            resized = self
                .resize_aggressively(file, self.config.aggressive_budget_kb)
                .await?;
        }
        report(progress, 0.5);

        let path = storage_path(&request.path, &resized.name, Utc::now().timestamp_millis());
        let upload_progress = |p: f32| report(progress, 0.5 + p * 0.5);
        let url = uploader
            .upload(&path, &resized, &upload_progress)
            .await
            .map_err(|e| UploadError::Storage(e.to_string()))?;
        report(progress, 1.0);

        info!(%path, size = resized.len(), upload_type = %request.upload_type, "image uploaded");
        Ok(UploadedImage {
            path,
            url,
            size: resized.len() as u64,
        })
    }
}

/// Resize and upload with the default thresholds.
pub async fn upload_resized_image<U>(
    file: &ImageFile,
    request: &UploadRequest,
    uploader: &U,
    progress: Option<&dyn ProgressObserver>,
) -> UploadResult<UploadedImage>
where
    U: ImageUploader + ?Sized,
{
    ImagePipeline::default()
        .upload(file, request, uploader, progress)
        .await
}

//! Client-side image processing before upload.
//!
//! Images are decoded, scaled to fit a bounding box without changing their
//! aspect ratio, and re-encoded at a given quality. When the result is still
//! over a byte budget, a fixed ladder of smaller presets is tried.

mod pipeline;
mod presets;
mod upload;

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{ResizeError, ResizeResult};

pub use pipeline::{
    resize_aggressively, resize_image, resize_images, scale_to_fit, ImagePipeline, ResizeStep,
    AGGRESSIVE_LADDER,
};
pub use presets::UploadType;
pub use upload::{
    storage_path, upload_resized_image, ImageUploader, StorageError, UploadRequest, UploadedImage,
};

// ─── Input / output file ─────────────────────────────────────────────

/// An image-bearing file as handed over by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Original file name, kept on resized output
    pub name: String,
    /// MIME type, e.g. "image/jpeg"
    pub mime_type: String,
    pub bytes: Bytes,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

// ─── Options ─────────────────────────────────────────────────────────

/// Encoding for resized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    /// PNG for PNG input, JPEG for everything else
    Auto,
}

impl OutputFormat {
    /// Resolve `Auto` against the input MIME type.
    pub fn resolve(self, input_mime: &str) -> OutputFormat {
        match self {
            OutputFormat::Auto if input_mime == "image/png" => OutputFormat::Png,
            OutputFormat::Auto => OutputFormat::Jpeg,
            other => other,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg | OutputFormat::Auto => "image/jpeg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ResizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "auto" => Ok(OutputFormat::Auto),
            other => Err(ResizeError::InvalidOptions(format!(
                "unknown output format '{other}'"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jpeg => write!(f, "jpeg"),
            OutputFormat::Png => write!(f, "png"),
            OutputFormat::Auto => write!(f, "auto"),
        }
    }
}

/// Bounding box, quality and format for one resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeOptions {
    /// Maximum output width in pixels
    pub max_width: u32,
    /// Maximum output height in pixels
    pub max_height: u32,
    /// Encoder quality, 0.0 to 1.0 (ignored for PNG)
    pub quality: f32,
    pub format: OutputFormat,
    /// Re-encode even when the input is under the small-file threshold
    pub force_resize: bool,
}

impl ResizeOptions {
    pub fn validate(&self) -> ResizeResult<()> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ResizeError::InvalidOptions(format!(
                "bounding box must be non-empty, got {}x{}",
                self.max_width, self.max_height
            )));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(ResizeError::InvalidOptions(format!(
                "quality must be between 0 and 1, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 800,
            quality: 0.7,
            format: OutputFormat::Jpeg,
            force_resize: false,
        }
    }
}

// ─── Progress ────────────────────────────────────────────────────────

/// Receives fractional progress (0.0 to 1.0) from a resize or upload.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, fraction: f32);
}

impl<F> ProgressObserver for F
where
    F: Fn(f32) + Send + Sync,
{
    fn on_progress(&self, fraction: f32) {
        self(fraction)
    }
}

pub(crate) fn report(progress: Option<&dyn ProgressObserver>, fraction: f32) {
    if let Some(observer) = progress {
        observer.on_progress(fraction);
    }
}

// ─── Size helpers ────────────────────────────────────────────────────

/// Whether a file of `size` bytes fits under `max_bytes`.
pub fn is_within_size_limit(size: u64, max_bytes: u64) -> bool {
    size <= max_bytes
}

/// Human-readable file size: "512 bytes", "1.5 KB", "2.0 MB".
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1_048_576 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn auto_format_follows_png_input() {
        assert_eq!(OutputFormat::Auto.resolve("image/png"), OutputFormat::Png);
        assert_eq!(OutputFormat::Auto.resolve("image/webp"), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::Png.resolve("image/jpeg"), OutputFormat::Png);
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
    }

    #[test]
    fn format_parsing() {
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("auto".parse::<OutputFormat>().unwrap(), OutputFormat::Auto);
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn options_validation() {
        assert!(ResizeOptions::default().validate().is_ok());
        let bad_quality = ResizeOptions {
            quality: 1.5,
            ..Default::default()
        };
        assert!(matches!(bad_quality.validate(), Err(ResizeError::InvalidOptions(_))));
        let empty_box = ResizeOptions {
            max_width: 0,
            ..Default::default()
        };
        assert!(empty_box.validate().is_err());
    }

    #[test]
    fn file_type_check() {
        let file = ImageFile::new("a.pdf", "application/pdf", vec![1, 2, 3]);
        assert!(!file.is_image());
        assert_eq!(file.len(), 3);
        assert!(ImageFile::new("a.png", "image/png", Vec::new()).is_image());
    }

    #[test]
    fn closures_are_progress_observers() {
        let seen = Mutex::new(Vec::new());
        let observer = |f: f32| seen.lock().unwrap().push(f);
        report(Some(&observer), 0.25);
        report(None, 0.5);
        assert_eq!(*seen.lock().unwrap(), vec![0.25]);
    }

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2.0 MB");
        assert!(is_within_size_limit(2 * 1024 * 1024, 2 * 1024 * 1024));
        assert!(!is_within_size_limit(2 * 1024 * 1024 + 1, 2 * 1024 * 1024));
    }
}

//! Resize presets for each kind of upload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{OutputFormat, ResizeOptions};

/// Where an uploaded image will be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadType {
    Avatar,
    Cover,
    #[default]
    Post,
    Logo,
}

impl UploadType {
    /// Bounding box, quality and format used for this kind of upload.
    pub fn resize_options(self) -> ResizeOptions {
        let (max_width, max_height, quality, format) = match self {
            UploadType::Avatar => (300, 300, 0.7, OutputFormat::Jpeg),
            UploadType::Cover => (1200, 400, 0.7, OutputFormat::Jpeg),
            UploadType::Post => (800, 800, 0.7, OutputFormat::Jpeg),
            UploadType::Logo => (300, 300, 0.8, OutputFormat::Png),
        };
        ResizeOptions {
            max_width,
            max_height,
            quality,
            format,
            force_resize: true,
        }
    }
}

impl FromStr for UploadType {
    type Err = std::convert::Infallible;

    /// Unknown names get the post preset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "avatar" => Self::Avatar,
            "cover" => Self::Cover,
            "logo" => Self::Logo,
            _ => Self::Post,
        })
    }
}

impl fmt::Display for UploadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Avatar => write!(f, "avatar"),
            Self::Cover => write!(f, "cover"),
            Self::Post => write!(f, "post"),
            Self::Logo => write!(f, "logo"),
        }
    }
}

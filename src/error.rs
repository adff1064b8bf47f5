//! Error types for the chord engine and the image pipeline.

use thiserror::Error;

/// Chord engine errors.
///
/// Chart parsing never fails; only key names supplied by the caller can be
/// rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChordError {
    /// The key name is not one of the twelve recognized pitch classes
    #[error("unrecognized key name: '{0}'")]
    InvalidKey(String),
}

/// Result type for chord engine operations
pub type ChordResult<T> = Result<T, ChordError>;

/// Image resize errors.
#[derive(Error, Debug)]
pub enum ResizeError {
    /// The input bytes could not be decoded as an image
    #[error("error loading image: {0}")]
    Decode(#[source] image::ImageError),

    /// The resized bitmap could not be encoded
    #[error("error encoding image: {0}")]
    Encode(#[source] image::ImageError),

    /// Width, height or quality out of range
    #[error("invalid resize options: {0}")]
    InvalidOptions(String),

    /// The blocking decode/encode task did not complete
    #[error("resize task failed: {0}")]
    Task(String),
}

/// Result type for resize operations
pub type ResizeResult<T> = Result<T, ResizeError>;

/// Errors from the resize-then-upload flow.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The file's MIME type is not `image/*`
    #[error("file is not an image: {0}")]
    NotAnImage(String),

    /// Resizing failed before anything was uploaded
    #[error(transparent)]
    Resize(#[from] ResizeError),

    /// The storage collaborator rejected the upload
    #[error("storage upload failed: {0}")]
    Storage(String),
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid value for environment variable
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// Configuration validation error
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_message_names_the_key() {
        let err = ChordError::InvalidKey("H".to_string());
        assert_eq!(err.to_string(), "unrecognized key name: 'H'");
    }

    #[test]
    fn resize_error_converts_into_upload_error() {
        let err: UploadError = ResizeError::InvalidOptions("quality".into()).into();
        assert!(matches!(err, UploadError::Resize(_)));
        assert_eq!(err.to_string(), "invalid resize options: quality");
    }
}

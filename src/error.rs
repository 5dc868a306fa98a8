// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the posture library.

use std::fmt;

/// Result type alias for posture operations.
pub type Result<T> = std::result::Result<T, PostureError>;

/// Main error type for the posture library.
#[derive(Debug)]
pub enum PostureError {
    /// Heatmap tensor has the wrong rank or an empty axis.
    InvalidTensor(String),
    /// Image or heatmap dimensions that cannot be used for scaling.
    InvalidDimensions(String),
    /// Keypoint channel count differs from the configured layout.
    ChannelMismatch {
        /// Channels the configuration expects.
        expected: usize,
        /// Channels present in the tensor.
        actual: usize,
    },
    /// Invalid configuration provided.
    ConfigError(String),
    /// Error processing images.
    ImageError(String),
    /// Error loading or parsing a font.
    FontError(String),
    /// IO error (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
}

impl fmt::Display for PostureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTensor(msg) => write!(f, "Invalid tensor: {msg}"),
            Self::InvalidDimensions(msg) => write!(f, "Invalid dimensions: {msg}"),
            Self::ChannelMismatch { expected, actual } => write!(
                f,
                "Channel mismatch: expected {expected} keypoint channels, got {actual}"
            ),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::FontError(msg) => write!(f, "Font error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for PostureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PostureError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for PostureError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PostureError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::InvalidTensor(err.to_string())
    }
}

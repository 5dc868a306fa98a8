// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pipeline configuration.
//!
//! [`PostureConfig`] ties together the classifier thresholds, the drawing
//! style, and the decode options. All types use a builder pattern.

use std::path::PathBuf;

use crate::error::{PostureError, Result};
use crate::posture::PostureThresholds;
use crate::results::KeypointIndex;
use crate::visualizer::SKELETON;

/// Drawing style for annotated images.
///
/// # Example
///
/// ```rust
/// use posture_inference::AnnotateStyle;
///
/// let style = AnnotateStyle::new()
///     .with_marker_ratio(0.01)
///     .with_label_scale(32.0);
/// assert!(style.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotateStyle {
    /// Fraction of the image's mean side length used as joint marker size.
    pub marker_ratio: f32,
    /// Label font size in pixels.
    pub label_scale: f32,
    /// Top-left corner of the label banner.
    pub label_offset: (i32, i32),
    /// Space between the label text and the banner edge.
    pub label_padding: i32,
    /// Banner opacity (0.0 to 1.0).
    pub banner_alpha: f32,
    /// Keypoint pairs drawn as skeleton edges.
    pub connections: &'static [[usize; 2]],
}

impl Default for AnnotateStyle {
    fn default() -> Self {
        Self {
            marker_ratio: 0.005,
            label_scale: 24.0,
            label_offset: (10, 10),
            label_padding: 6,
            banner_alpha: 0.6,
            connections: &SKELETON,
        }
    }
}

impl AnnotateStyle {
    /// Create a style with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the marker-size ratio.
    #[must_use]
    pub const fn with_marker_ratio(mut self, ratio: f32) -> Self {
        self.marker_ratio = ratio;
        self
    }

    /// Set the label font size in pixels.
    #[must_use]
    pub const fn with_label_scale(mut self, scale: f32) -> Self {
        self.label_scale = scale;
        self
    }

    /// Set the banner's top-left corner.
    #[must_use]
    pub const fn with_label_offset(mut self, x: i32, y: i32) -> Self {
        self.label_offset = (x, y);
        self
    }

    /// Set the banner opacity.
    #[must_use]
    pub const fn with_banner_alpha(mut self, alpha: f32) -> Self {
        self.banner_alpha = alpha;
        self
    }

    /// Replace the connection table.
    #[must_use]
    pub const fn with_connections(mut self, connections: &'static [[usize; 2]]) -> Self {
        self.connections = connections;
        self
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`PostureError::ConfigError`] for a negative or non-finite
    /// marker ratio, a non-positive label scale, a negative padding, or an
    /// alpha outside `0.0..=1.0`.
    pub fn validate(&self) -> Result<()> {
        if !self.marker_ratio.is_finite() || self.marker_ratio < 0.0 {
            return Err(PostureError::ConfigError(format!(
                "marker_ratio must be finite and non-negative, got {}",
                self.marker_ratio
            )));
        }
        if !self.label_scale.is_finite() || self.label_scale <= 0.0 {
            return Err(PostureError::ConfigError(format!(
                "label_scale must be positive, got {}",
                self.label_scale
            )));
        }
        if self.label_padding < 0 {
            return Err(PostureError::ConfigError(format!(
                "label_padding must be non-negative, got {}",
                self.label_padding
            )));
        }
        if !(0.0..=1.0).contains(&self.banner_alpha) {
            return Err(PostureError::ConfigError(format!(
                "banner_alpha must be within 0.0..=1.0, got {}",
                self.banner_alpha
            )));
        }
        Ok(())
    }
}

/// Configuration for the posture pipeline.
///
/// # Example
///
/// ```rust
/// use posture_inference::{PostureConfig, PostureThresholds};
///
/// let config = PostureConfig::new()
///     .with_thresholds(PostureThresholds::new().with_leg_segment_factor(0.35))
///     .with_output_size(48, 64)
///     .with_marker_ratio(0.008);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PostureConfig {
    /// Classifier thresholds.
    pub thresholds: PostureThresholds,
    /// Drawing style.
    pub style: AnnotateStyle,
    /// Required keypoint channel count. `None` accepts any count.
    pub expected_keypoints: Option<usize>,
    /// Output (width, height) used for the decode scale factors.
    /// If `None`, the heatmap tensor's own width and height are used. Values
    /// smaller than the tensor are rejected when decoding.
    pub output_size: Option<(usize, usize)>,
    /// TrueType font for the label. If `None`, the cached default font is used.
    pub font_path: Option<PathBuf>,
}

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            thresholds: PostureThresholds::DEFAULT,
            style: AnnotateStyle::default(),
            expected_keypoints: Some(KeypointIndex::COUNT),
            output_size: None,
            font_path: None,
        }
    }
}

impl PostureConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the classifier thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: PostureThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the drawing style.
    #[must_use]
    pub fn with_style(mut self, style: AnnotateStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the marker-size ratio of the drawing style.
    #[must_use]
    pub fn with_marker_ratio(mut self, ratio: f32) -> Self {
        self.style.marker_ratio = ratio;
        self
    }

    /// Require a specific keypoint channel count, or `None` to accept any.
    #[must_use]
    pub fn with_expected_keypoints(mut self, expected: Option<usize>) -> Self {
        self.expected_keypoints = expected;
        self
    }

    /// Override the output (width, height) used for the decode scale factors.
    #[must_use]
    pub fn with_output_size(mut self, width: usize, height: usize) -> Self {
        self.output_size = Some((width, height));
        self
    }

    /// Set the label font path.
    #[must_use]
    pub fn with_font_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.font_path = Some(path.into());
        self
    }

    /// Validate thresholds, style and decode options.
    ///
    /// # Errors
    ///
    /// Returns [`PostureError::ConfigError`] for the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.style.validate()?;
        if let Some((w, h)) = self.output_size {
            if w == 0 || h == 0 {
                return Err(PostureError::ConfigError(format!(
                    "output_size must be non-zero, got {w}x{h}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PostureConfig::default();
        assert_eq!(config.expected_keypoints, Some(17));
        assert!(config.output_size.is_none());
        assert!((config.style.marker_ratio - 0.005).abs() < f32::EPSILON);
        assert_eq!(config.style.connections.len(), SKELETON.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PostureConfig::new()
            .with_output_size(48, 64)
            .with_expected_keypoints(None)
            .with_marker_ratio(0.02)
            .with_font_path("fonts/Arial.ttf");

        assert_eq!(config.output_size, Some((48, 64)));
        assert!(config.expected_keypoints.is_none());
        assert!((config.style.marker_ratio - 0.02).abs() < f32::EPSILON);
        assert_eq!(config.font_path, Some(PathBuf::from("fonts/Arial.ttf")));
    }

    #[test]
    fn test_config_validation() {
        assert!(PostureConfig::new().with_output_size(0, 64).validate().is_err());
        assert!(PostureConfig::new().with_marker_ratio(-1.0).validate().is_err());
        let style = AnnotateStyle::new().with_banner_alpha(1.5);
        assert!(PostureConfig::new().with_style(style).validate().is_err());
        let style = AnnotateStyle::new().with_label_scale(0.0);
        assert!(style.validate().is_err());
    }
}

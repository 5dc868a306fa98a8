// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Decode → classify → annotate pipeline.
//!
//! The label is computed once in [`PosturePipeline::analyze`] and handed to the
//! renderer through [`PoseResult`], so drawing never re-runs the classifier.

use std::time::Instant;

#[cfg(feature = "annotate")]
use ab_glyph::FontArc;
#[cfg(feature = "annotate")]
use image::{DynamicImage, RgbImage};
use ndarray::ArrayViewD;

use crate::config::PostureConfig;
use crate::error::{PostureError, Result};
use crate::posture::{PostureLabel, classify_posture_with};
use crate::postprocessing::{HeatmapShape, decode_heatmaps};
use crate::results::{Keypoint, PoseResult, Speed};

/// Stateless posture pipeline.
///
/// Holds only immutable configuration (and an optional font), so one
/// instance can be shared across threads working on disjoint images.
///
/// # Example
///
/// ```rust
/// use ndarray::Array4;
/// use posture_inference::{PostureConfig, PosturePipeline};
///
/// let pipeline = PosturePipeline::new(PostureConfig::new())?;
/// let heatmaps = Array4::<f32>::zeros((1, 17, 64, 48));
/// let result = pipeline.analyze(&heatmaps.view().into_dyn(), 480, 640)?;
/// assert_eq!(result.keypoints.len(), 17);
/// # Ok::<(), posture_inference::PostureError>(())
/// ```
#[derive(Clone)]
pub struct PosturePipeline {
    config: PostureConfig,
    #[cfg(feature = "annotate")]
    font: Option<FontArc>,
}

impl PosturePipeline {
    /// Create a pipeline without a label font.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: PostureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            #[cfg(feature = "annotate")]
            font: None,
        })
    }

    /// Pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &PostureConfig {
        &self.config
    }

    /// Use a specific font for the label.
    #[cfg(feature = "annotate")]
    #[must_use]
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Resolve the label font from `config.font_path`, or the cached default font.
    ///
    /// A missing default font is not an error: the label is simply not drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `font_path` cannot be loaded.
    #[cfg(feature = "annotate")]
    pub fn load_font(mut self) -> Result<Self> {
        self.font = match &self.config.font_path {
            Some(path) => Some(crate::annotate::load_font(path)?),
            None => crate::annotate::check_font(crate::annotate::DEFAULT_FONT)
                .and_then(|path| crate::annotate::load_font(path).ok()),
        };
        if self.font.is_none() {
            crate::warn!("No label font available, posture labels will not be drawn");
        }
        Ok(self)
    }

    /// Whether a label font is loaded.
    #[cfg(feature = "annotate")]
    #[must_use]
    pub const fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Decode keypoints from a `[1, K, Hm, Wm]` heatmap tensor.
    ///
    /// Scale factors use `config.output_size` when set, else the tensor's `Wm`/`Hm`.
    /// An `output_size` smaller than the tensor is rejected, since decoded
    /// keypoints would then fall outside the original image.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor shape or any dimension is invalid.
    pub fn decode(
        &self,
        heatmaps: &ArrayViewD<'_, f32>,
        orig_width: u32,
        orig_height: u32,
    ) -> Result<Vec<Keypoint>> {
        let shape = HeatmapShape::from_shape(heatmaps.shape(), self.config.expected_keypoints)?;
        let (out_w, out_h) = self.config.output_size.unwrap_or((shape.width, shape.height));
        if out_w < shape.width || out_h < shape.height {
            return Err(PostureError::InvalidDimensions(format!(
                "output size {out_w}x{out_h} is smaller than the {}x{} heatmap",
                shape.width, shape.height
            )));
        }
        decode_heatmaps(heatmaps, orig_width, orig_height, out_w, out_h)
    }

    /// Classify a keypoint sequence with the configured thresholds.
    #[must_use]
    pub fn classify(&self, keypoints: &[Keypoint]) -> PostureLabel {
        classify_posture_with(keypoints, &self.config.thresholds)
    }

    /// Decode and classify in one pass.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    pub fn analyze(
        &self,
        heatmaps: &ArrayViewD<'_, f32>,
        orig_width: u32,
        orig_height: u32,
    ) -> Result<PoseResult> {
        let start_decode = Instant::now();
        let keypoints = self.decode(heatmaps, orig_width, orig_height)?;
        let decode_time = start_decode.elapsed().as_secs_f64() * 1000.0;

        let start_classify = Instant::now();
        let label = self.classify(&keypoints);
        let classify_time = start_classify.elapsed().as_secs_f64() * 1000.0;

        Ok(PoseResult::new(
            keypoints,
            label,
            (orig_width, orig_height),
            Speed::new(decode_time, classify_time),
        ))
    }

    /// Draw a result onto an image buffer in place and record the draw time.
    #[cfg(feature = "annotate")]
    pub fn draw(&self, image: &mut RgbImage, result: &mut PoseResult) {
        let start = Instant::now();
        crate::annotate::draw_pose(
            image,
            &result.keypoints,
            result.label,
            self.font.as_ref(),
            &self.config.style,
        );
        result.speed.annotate = Some(start.elapsed().as_secs_f64() * 1000.0);
    }

    /// Annotate a copy of an image with a result.
    #[cfg(feature = "annotate")]
    #[must_use]
    pub fn annotate(&self, image: &DynamicImage, result: &PoseResult) -> DynamicImage {
        crate::annotate::annotate_image(
            image,
            &result.keypoints,
            result.label,
            self.font.as_ref(),
            &self.config.style,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    /// Heatmaps whose peaks land on a standing body in a 480x640 (w x h) image.
    fn standing_heatmaps() -> Array4<f32> {
        // 48x64 heatmap, scale 10: cell (row, col) maps to ((col + 0.5) * 10, (row + 0.5) * 10)
        let mut heatmaps = Array4::<f32>::zeros((1, 17, 64, 48));
        let peaks: [(usize, usize); 17] = [
            (8, 24),  // nose
            (7, 23),  // left eye
            (7, 25),  // right eye
            (8, 22),  // left ear
            (8, 26),  // right ear
            (10, 21), // left shoulder
            (10, 27), // right shoulder
            (15, 20), // left elbow
            (15, 28), // right elbow
            (20, 20), // left wrist
            (20, 28), // right wrist
            (20, 22), // left hip
            (20, 26), // right hip
            (30, 22), // left knee
            (30, 26), // right knee
            (40, 22), // left ankle
            (40, 26), // right ankle
        ];
        for (k, (row, col)) in peaks.iter().enumerate() {
            heatmaps[[0, k, *row, *col]] = 0.9;
        }
        heatmaps
    }

    #[test]
    fn test_analyze_standing() {
        let pipeline = PosturePipeline::new(PostureConfig::new()).unwrap();
        let heatmaps = standing_heatmaps();
        let result = pipeline.analyze(&heatmaps.view().into_dyn(), 480, 640).unwrap();

        assert_eq!(result.len(), 17);
        assert_eq!(result.label, PostureLabel::Standing);
        assert_eq!(result.orig_size, (480, 640));
        assert!(result.speed.decode.is_some());
        assert!(result.weak_keypoints(0.5).is_empty());
    }

    #[test]
    fn test_channel_mismatch() {
        let pipeline = PosturePipeline::new(PostureConfig::new()).unwrap();
        let heatmaps = Array4::<f32>::zeros((1, 16, 8, 8));
        let err = pipeline.analyze(&heatmaps.view().into_dyn(), 64, 64).unwrap_err();
        assert!(matches!(err, PostureError::ChannelMismatch { .. }));
    }

    #[test]
    fn test_any_channel_count_when_unchecked() {
        let config = PostureConfig::new().with_expected_keypoints(None);
        let pipeline = PosturePipeline::new(config).unwrap();
        let heatmaps = Array4::<f32>::zeros((1, 5, 8, 8));
        let result = pipeline.analyze(&heatmaps.view().into_dyn(), 64, 64).unwrap();
        assert_eq!(result.len(), 5);
        assert_eq!(result.label, PostureLabel::UnknownFewKeypoints);
    }

    #[test]
    fn test_output_size_override() {
        let config = PostureConfig::new()
            .with_expected_keypoints(None)
            .with_output_size(16, 16);
        let pipeline = PosturePipeline::new(config).unwrap();
        let mut heatmaps = Array4::<f32>::zeros((1, 1, 8, 8));
        heatmaps[[0, 0, 1, 1]] = 1.0;
        let kps = pipeline.decode(&heatmaps.view().into_dyn(), 160, 160).unwrap();
        assert!((kps[0].x - 15.0).abs() < 1e-4);
        assert!((kps[0].y - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_output_size_below_tensor_rejected() {
        let config = PostureConfig::new()
            .with_expected_keypoints(None)
            .with_output_size(4, 8);
        let pipeline = PosturePipeline::new(config).unwrap();
        let mut heatmaps = Array4::<f32>::zeros((1, 1, 8, 8));
        heatmaps[[0, 0, 7, 7]] = 1.0;
        let err = pipeline.decode(&heatmaps.view().into_dyn(), 80, 80).unwrap_err();
        assert!(matches!(err, PostureError::InvalidDimensions(_)));

        // Equal to the tensor size keeps every keypoint inside the image
        let pipeline = PosturePipeline::new(
            PostureConfig::new()
                .with_expected_keypoints(None)
                .with_output_size(8, 8),
        )
        .unwrap();
        let kps = pipeline.decode(&heatmaps.view().into_dyn(), 80, 80).unwrap();
        assert!(kps[0].x <= 80.0 && kps[0].y <= 80.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PostureConfig::new().with_output_size(0, 0);
        assert!(PosturePipeline::new(config).is_err());
    }

    #[cfg(feature = "annotate")]
    #[test]
    fn test_annotate_keeps_dimensions() {
        let pipeline = PosturePipeline::new(PostureConfig::new()).unwrap();
        assert!(!pipeline.has_font());
        let heatmaps = standing_heatmaps();
        let mut result = pipeline.analyze(&heatmaps.view().into_dyn(), 480, 640).unwrap();

        let image = DynamicImage::ImageRgb8(RgbImage::new(480, 640));
        let annotated = pipeline.annotate(&image, &result);
        assert_eq!((annotated.width(), annotated.height()), (480, 640));

        let mut buffer = RgbImage::new(480, 640);
        pipeline.draw(&mut buffer, &mut result);
        assert_eq!(buffer.dimensions(), (480, 640));
        assert!(result.speed.annotate.is_some());
        assert_eq!(buffer, annotated.to_rgb8());
    }
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Post-processing for pose heatmap outputs.
//!
//! Pose heatmap models output a tensor of shape `[1, K, Hm, Wm]` where each of
//! the `K` channels is a confidence map for one keypoint. Decoding takes the
//! hottest cell of every channel and maps its center back to the original
//! image.

use ndarray::{ArrayView2, ArrayViewD, Ix4, s};

use crate::error::{PostureError, Result};
use crate::results::Keypoint;

/// Validated heatmap tensor dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapShape {
    /// Batch size (only index 0 is decoded).
    pub batch: usize,
    /// Number of keypoint channels.
    pub channels: usize,
    /// Heatmap height in cells.
    pub height: usize,
    /// Heatmap width in cells.
    pub width: usize,
}

impl HeatmapShape {
    /// Validate a raw tensor shape.
    ///
    /// # Arguments
    ///
    /// * `shape` - Tensor shape, expected `[batch, channels, height, width]`.
    /// * `expected_channels` - Required channel count, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the rank is not 4, the batch or spatial axes are
    /// empty, or the channel count differs from `expected_channels`.
    pub fn from_shape(shape: &[usize], expected_channels: Option<usize>) -> Result<Self> {
        let &[batch, channels, height, width] = shape else {
            return Err(PostureError::InvalidTensor(format!(
                "expected a 4D heatmap tensor [batch, keypoints, height, width], got shape {shape:?}"
            )));
        };

        if batch == 0 {
            return Err(PostureError::InvalidTensor(
                "heatmap tensor has an empty batch dimension".to_string(),
            ));
        }
        if height == 0 || width == 0 {
            return Err(PostureError::InvalidTensor(format!(
                "heatmap has no cells ({height}x{width})"
            )));
        }
        if let Some(expected) = expected_channels {
            if channels != expected {
                return Err(PostureError::ChannelMismatch {
                    expected,
                    actual: channels,
                });
            }
        }

        Ok(Self {
            batch,
            channels,
            height,
            width,
        })
    }
}

/// Locate the maximum cell of a single heatmap channel.
///
/// Cells are scanned in row-major order and only a strictly greater value
/// replaces the current best, so the first of several equal maxima wins.
/// NaN cells never win.
///
/// # Returns
///
/// `(row, col, value)` of the winning cell. An all-NaN channel yields `(0, 0, NaN)`.
#[must_use]
pub fn argmax_2d(heatmap: &ArrayView2<'_, f32>) -> (usize, usize, f32) {
    let mut best = (0, 0, f32::NEG_INFINITY);
    let mut found = false;

    for ((y, x), &value) in heatmap.indexed_iter() {
        if value > best.2 || (!found && !value.is_nan()) {
            best = (y, x, value);
            found = true;
        }
    }

    if !found {
        best.2 = heatmap.get((0, 0)).copied().unwrap_or(f32::NAN);
    }
    best
}

/// Decode keypoints from a heatmap tensor.
///
/// For every channel the hottest cell is converted to original-image
/// coordinates using its center:
/// `x = (col + 0.5) * orig_width / heatmap_width` and likewise for `y`.
/// No confidence threshold is applied; one keypoint is returned per channel.
///
/// # Arguments
///
/// * `heatmaps` - Tensor of shape `[1, K, Hm, Wm]`.
/// * `orig_width`, `orig_height` - Original image size in pixels.
/// * `heatmap_width`, `heatmap_height` - Output size used for the scale factors.
///   Usually the tensor's own `Wm` and `Hm`.
///
/// # Errors
///
/// Returns an error if the tensor is not 4D, has an empty batch or spatial
/// axis, or any of the supplied dimensions is zero.
///
/// # Example
///
/// ```rust
/// use ndarray::Array4;
/// use posture_inference::postprocessing::decode_heatmaps;
///
/// let mut heatmaps = Array4::<f32>::zeros((1, 2, 4, 4));
/// heatmaps[[0, 1, 3, 2]] = 1.0;
///
/// let keypoints = decode_heatmaps(&heatmaps.view().into_dyn(), 400, 400, 4, 4)?;
/// assert_eq!(keypoints.len(), 2);
/// assert_eq!((keypoints[1].x, keypoints[1].y), (250.0, 350.0));
/// # Ok::<(), posture_inference::PostureError>(())
/// ```
pub fn decode_heatmaps(
    heatmaps: &ArrayViewD<'_, f32>,
    orig_width: u32,
    orig_height: u32,
    heatmap_width: usize,
    heatmap_height: usize,
) -> Result<Vec<Keypoint>> {
    let shape = HeatmapShape::from_shape(heatmaps.shape(), None)?;
    decode_validated(heatmaps, shape, orig_width, orig_height, heatmap_width, heatmap_height)
}

/// Decode keypoints, requiring a specific channel count.
///
/// # Errors
///
/// Same as [`decode_heatmaps`], plus [`PostureError::ChannelMismatch`].
pub fn decode_heatmaps_expecting(
    heatmaps: &ArrayViewD<'_, f32>,
    expected_channels: usize,
    orig_width: u32,
    orig_height: u32,
    heatmap_width: usize,
    heatmap_height: usize,
) -> Result<Vec<Keypoint>> {
    let shape = HeatmapShape::from_shape(heatmaps.shape(), Some(expected_channels))?;
    decode_validated(heatmaps, shape, orig_width, orig_height, heatmap_width, heatmap_height)
}

#[allow(clippy::cast_precision_loss)]
fn decode_validated(
    heatmaps: &ArrayViewD<'_, f32>,
    shape: HeatmapShape,
    orig_width: u32,
    orig_height: u32,
    heatmap_width: usize,
    heatmap_height: usize,
) -> Result<Vec<Keypoint>> {
    if orig_width == 0 || orig_height == 0 {
        return Err(PostureError::InvalidDimensions(format!(
            "original image size must be non-zero, got {orig_width}x{orig_height}"
        )));
    }
    if heatmap_width == 0 || heatmap_height == 0 {
        return Err(PostureError::InvalidDimensions(format!(
            "heatmap output size must be non-zero, got {heatmap_width}x{heatmap_height}"
        )));
    }
    if shape.batch > 1 {
        crate::warn!(
            "Heatmap batch size is {}, only the first item is decoded",
            shape.batch
        );
    }

    let tensor = heatmaps.view().into_dimensionality::<Ix4>()?;
    let scale_x = orig_width as f32 / heatmap_width as f32;
    let scale_y = orig_height as f32 / heatmap_height as f32;

    let keypoints = (0..shape.channels)
        .map(|channel| {
            let plane = tensor.slice(s![0, channel, .., ..]);
            let (max_y, max_x, confidence) = argmax_2d(&plane);
            Keypoint::with_confidence(
                (max_x as f32 + 0.5) * scale_x,
                (max_y as f32 + 0.5) * scale_y,
                confidence,
            )
        })
        .collect();

    Ok(keypoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array4, ArrayD, IxDyn};

    #[test]
    fn test_heatmap_shape() {
        let shape = HeatmapShape::from_shape(&[1, 17, 64, 48], Some(17)).unwrap();
        assert_eq!(shape.channels, 17);
        assert_eq!((shape.height, shape.width), (64, 48));
    }

    #[test]
    fn test_rank_errors() {
        assert!(matches!(
            HeatmapShape::from_shape(&[17, 64, 48], None),
            Err(PostureError::InvalidTensor(_))
        ));
        assert!(matches!(
            HeatmapShape::from_shape(&[1, 1, 17, 64, 48], None),
            Err(PostureError::InvalidTensor(_))
        ));
        assert!(matches!(
            HeatmapShape::from_shape(&[0, 17, 64, 48], None),
            Err(PostureError::InvalidTensor(_))
        ));
        assert!(matches!(
            HeatmapShape::from_shape(&[1, 17, 0, 48], None),
            Err(PostureError::InvalidTensor(_))
        ));
    }

    #[test]
    fn test_channel_mismatch() {
        let err = HeatmapShape::from_shape(&[1, 16, 64, 48], Some(17)).unwrap_err();
        assert!(matches!(
            err,
            PostureError::ChannelMismatch {
                expected: 17,
                actual: 16
            }
        ));
    }

    #[test]
    fn test_three_dim_tensor_rejected() {
        let heatmaps = ArrayD::<f32>::zeros(IxDyn(&[17, 8, 8]));
        let result = decode_heatmaps(&heatmaps.view(), 100, 100, 8, 8);
        assert!(result.is_err());
    }

    #[test]
    fn test_argmax_first_wins_on_tie() {
        let mut plane = ndarray::Array2::<f32>::zeros((3, 3));
        plane[[1, 2]] = 0.7;
        plane[[2, 0]] = 0.7;
        plane[[0, 1]] = 0.3;
        assert_eq!(argmax_2d(&plane.view()), (1, 2, 0.7));
    }

    #[test]
    fn test_argmax_all_equal_returns_origin() {
        let plane = ndarray::Array2::<f32>::from_elem((4, 5), 0.2);
        assert_eq!(argmax_2d(&plane.view()), (0, 0, 0.2));
    }

    #[test]
    fn test_argmax_skips_nan() {
        let mut plane = ndarray::Array2::<f32>::zeros((2, 2));
        plane[[0, 0]] = f32::NAN;
        plane[[1, 1]] = -1.0;
        plane[[0, 1]] = -2.0;
        plane[[1, 0]] = -3.0;
        assert_eq!(argmax_2d(&plane.view()), (1, 1, -1.0));

        let all_nan = ndarray::Array2::<f32>::from_elem((2, 2), f32::NAN);
        let (y, x, v) = argmax_2d(&all_nan.view());
        assert_eq!((y, x), (0, 0));
        assert!(v.is_nan());
    }

    #[test]
    fn test_decode_scales_cell_center() {
        // 64x48 heatmap for a 640x480 image: scale 10 on both axes
        let mut heatmaps = Array4::<f32>::zeros((1, 3, 48, 64));
        heatmaps[[0, 0, 10, 20]] = 0.9;
        heatmaps[[0, 1, 0, 0]] = 0.5;
        heatmaps[[0, 2, 47, 63]] = 0.1;

        let kps = decode_heatmaps(&heatmaps.view().into_dyn(), 640, 480, 64, 48).unwrap();
        assert_eq!(kps.len(), 3);
        assert!((kps[0].x - 205.0).abs() < 1e-4);
        assert!((kps[0].y - 105.0).abs() < 1e-4);
        assert!((kps[0].confidence - 0.9).abs() < 1e-6);
        assert!((kps[1].x - 5.0).abs() < 1e-4);
        assert!((kps[1].y - 5.0).abs() < 1e-4);
        assert!((kps[2].x - 635.0).abs() < 1e-4);
        assert!((kps[2].y - 475.0).abs() < 1e-4);
    }

    #[test]
    fn test_decode_stays_within_image() {
        let (w, h) = (333_u32, 517_u32);
        let mut heatmaps = Array4::<f32>::zeros((1, 4, 7, 9));
        heatmaps[[0, 0, 0, 0]] = 1.0;
        heatmaps[[0, 1, 6, 8]] = 1.0;
        heatmaps[[0, 2, 0, 8]] = 1.0;
        heatmaps[[0, 3, 6, 0]] = 1.0;

        let kps = decode_heatmaps(&heatmaps.view().into_dyn(), w, h, 9, 7).unwrap();
        for kp in &kps {
            assert!(kp.x >= 0.0 && kp.x <= w as f32);
            assert!(kp.y >= 0.0 && kp.y <= h as f32);
        }
    }

    #[test]
    fn test_decode_uses_supplied_output_size() {
        // Tensor is 4x4 but the model output is declared as 8x8
        let mut heatmaps = Array4::<f32>::zeros((1, 1, 4, 4));
        heatmaps[[0, 0, 1, 3]] = 1.0;
        let kps = decode_heatmaps(&heatmaps.view().into_dyn(), 80, 80, 8, 8).unwrap();
        assert!((kps[0].x - 35.0).abs() < 1e-4);
        assert!((kps[0].y - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_decode_zero_dimensions() {
        let heatmaps = Array4::<f32>::zeros((1, 1, 4, 4));
        assert!(matches!(
            decode_heatmaps(&heatmaps.view().into_dyn(), 0, 80, 4, 4),
            Err(PostureError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode_heatmaps(&heatmaps.view().into_dyn(), 80, 80, 4, 0),
            Err(PostureError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_decode_batch_uses_first_item() {
        let mut heatmaps = Array4::<f32>::zeros((2, 1, 2, 2));
        heatmaps[[0, 0, 1, 1]] = 1.0;
        heatmaps[[1, 0, 0, 0]] = 5.0;
        let kps = decode_heatmaps(&heatmaps.view().into_dyn(), 2, 2, 2, 2).unwrap();
        assert!((kps[0].x - 1.5).abs() < 1e-6);
        assert!((kps[0].y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_decode_deterministic() {
        let heatmaps = Array4::<f32>::from_shape_fn((1, 17, 16, 12), |(_, c, y, x)| {
            ((c * 31 + y * 7 + x * 3) % 11) as f32
        });
        let view = heatmaps.view().into_dyn();
        let first = decode_heatmaps_expecting(&view, 17, 120, 160, 12, 16).unwrap();
        let second = decode_heatmaps_expecting(&view, 17, 120, 160, 12, 16).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 17);
    }

    #[test]
    fn test_decode_non_contiguous_view() {
        // Transposed spatial axes exercise the logical (not memory) scan order
        let mut base = Array4::<f32>::zeros((1, 1, 3, 2));
        base[[0, 0, 2, 0]] = 1.0;
        base[[0, 0, 0, 1]] = 1.0;
        let permuted = base.view().permuted_axes([0, 1, 3, 2]);
        let kps = decode_heatmaps(&permuted.into_dyn(), 3, 2, 3, 2).unwrap();
        // Logical shape is 2x3; first max in row-major order is at (0, 2)
        assert!((kps[0].x - 2.5).abs() < 1e-6);
        assert!((kps[0].y - 0.5).abs() < 1e-6);
    }
}

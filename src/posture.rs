// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Rule-based posture classification from COCO-17 keypoints.
//!
//! Only the nose, shoulders, hips, knees and ankles are read. Every threshold
//! is a ratio of the torso height (or shoulder width), so scaling all
//! coordinates by the same positive factor leaves the label unchanged as long
//! as the torso stays above [`PostureThresholds::min_torso_px`].

use std::fmt;

use crate::error::{PostureError, Result};
use crate::results::{Keypoint, KeypointIndex};

/// Discrete posture label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostureLabel {
    /// Upright body with extended thighs and shins.
    Standing,
    /// Compressed thighs, extended shins.
    Sitting,
    /// Horizontal body.
    LyingDown,
    /// Upright torso with both leg segments folded.
    SquattingCrouching,
    /// No rule matched.
    Unknown,
    /// Fewer than 17 keypoints were supplied.
    UnknownFewKeypoints,
    /// Torso height collapsed to zero.
    UnknownUnreliableTorso,
    /// Hips are not visibly below the shoulders.
    UnknownTorsoNotUpright,
}

impl PostureLabel {
    /// Human-readable label drawn on the image.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standing => "Standing",
            Self::Sitting => "Sitting",
            Self::LyingDown => "Lying Down",
            Self::SquattingCrouching => "Squatting/Crouching",
            Self::Unknown => "Unknown",
            Self::UnknownFewKeypoints => "Unknown (Few Keypoints)",
            Self::UnknownUnreliableTorso => "Unknown (Unreliable Torso Keypoints)",
            Self::UnknownTorsoNotUpright => "Unknown (Torso Not Upright)",
        }
    }

    /// Whether this is one of the `Unknown` variants.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(
            self,
            Self::Unknown
                | Self::UnknownFewKeypoints
                | Self::UnknownUnreliableTorso
                | Self::UnknownTorsoNotUpright
        )
    }
}

impl fmt::Display for PostureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ratio constants for the posture rules.
///
/// Lengths are expressed as multiples of the torso height unless the field
/// name says otherwise.
///
/// # Example
///
/// ```rust
/// use posture_inference::PostureThresholds;
///
/// let thresholds = PostureThresholds::new()
///     .with_leg_segment_factor(0.35)
///     .with_upright_min_aspect_ratio(1.2);
/// assert!(thresholds.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureThresholds {
    /// Max left/right Y difference of shoulders and hips for a lying body.
    pub lying_alignment_ratio: f32,
    /// Shoulder width above this multiple of shoulder-to-ankle span means wider than tall.
    pub lying_width_ratio: f32,
    /// Shoulder-to-ankle span below this multiple of torso height means vertically compressed.
    pub lying_compressed_ratio: f32,
    /// Compression only counts while torso height exceeds this multiple of shoulder width.
    pub lying_torso_width_ratio: f32,
    /// Shoulder-to-ankle span must stay below this multiple of shoulder width.
    pub lying_max_vertical_ratio: f32,
    /// Shoulders must sit at least this far above the hips.
    pub torso_upright_ratio: f32,
    /// Minimum thigh/shin vertical span for an extended leg segment.
    pub leg_segment_factor: f32,
    /// Shoulder-to-ankle span must exceed this multiple of shoulder width.
    pub upright_min_aspect_ratio: f32,
    /// Minimum hip→knee and knee→ankle drop for standing.
    pub standing_order_margin: f32,
    /// Minimum knee→ankle drop for sitting.
    pub sitting_shin_margin: f32,
    /// Hips may sit at most this far below the knees when sitting.
    pub sitting_hip_knee_ratio: f32,
    /// Thighs count as very bent below this multiple of the leg-segment threshold.
    pub squat_thigh_factor: f32,
    /// Hips must be lower than this far above the knees when squatting.
    pub squat_hip_knee_ratio: f32,
    /// Torso below this fraction of the overall height is considered unstable.
    pub torso_overall_ratio: f32,
    /// Floor for the torso height, in pixels.
    pub min_torso_px: f32,
    /// Torso heights at or below this are unusable.
    pub torso_epsilon: f32,
}

impl PostureThresholds {
    /// Default thresholds.
    pub const DEFAULT: Self = Self {
        lying_alignment_ratio: 0.35,
        lying_width_ratio: 0.9,
        lying_compressed_ratio: 0.7,
        lying_torso_width_ratio: 0.5,
        lying_max_vertical_ratio: 1.5,
        torso_upright_ratio: 0.15,
        leg_segment_factor: 0.40,
        upright_min_aspect_ratio: 1.1,
        standing_order_margin: 0.05,
        sitting_shin_margin: 0.1,
        sitting_hip_knee_ratio: 0.6,
        squat_thigh_factor: 1.1,
        squat_hip_knee_ratio: 0.3,
        torso_overall_ratio: 0.10,
        min_torso_px: 15.0,
        torso_epsilon: 1e-5,
    };

    /// Create thresholds with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Set the left/right alignment ratio used to detect a lying body.
    #[must_use]
    pub const fn with_lying_alignment_ratio(mut self, ratio: f32) -> Self {
        self.lying_alignment_ratio = ratio;
        self
    }

    /// Set the width/height ratio used to detect a lying body.
    #[must_use]
    pub const fn with_lying_width_ratio(mut self, ratio: f32) -> Self {
        self.lying_width_ratio = ratio;
        self
    }

    /// Set the max vertical/width ratio a lying body may have.
    #[must_use]
    pub const fn with_lying_max_vertical_ratio(mut self, ratio: f32) -> Self {
        self.lying_max_vertical_ratio = ratio;
        self
    }

    /// Set the leg-segment threshold factor (multiple of torso height).
    #[must_use]
    pub const fn with_leg_segment_factor(mut self, factor: f32) -> Self {
        self.leg_segment_factor = factor;
        self
    }

    /// Set the minimum height/width aspect ratio of an upright silhouette.
    #[must_use]
    pub const fn with_upright_min_aspect_ratio(mut self, ratio: f32) -> Self {
        self.upright_min_aspect_ratio = ratio;
        self
    }

    /// Set the torso height floor in pixels.
    #[must_use]
    pub const fn with_min_torso_px(mut self, px: f32) -> Self {
        self.min_torso_px = px;
        self
    }

    /// Check that every threshold is finite and positive.
    ///
    /// # Errors
    ///
    /// Returns [`PostureError::ConfigError`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("lying_alignment_ratio", self.lying_alignment_ratio),
            ("lying_width_ratio", self.lying_width_ratio),
            ("lying_compressed_ratio", self.lying_compressed_ratio),
            ("lying_torso_width_ratio", self.lying_torso_width_ratio),
            ("lying_max_vertical_ratio", self.lying_max_vertical_ratio),
            ("torso_upright_ratio", self.torso_upright_ratio),
            ("leg_segment_factor", self.leg_segment_factor),
            ("upright_min_aspect_ratio", self.upright_min_aspect_ratio),
            ("standing_order_margin", self.standing_order_margin),
            ("sitting_shin_margin", self.sitting_shin_margin),
            ("sitting_hip_knee_ratio", self.sitting_hip_knee_ratio),
            ("squat_thigh_factor", self.squat_thigh_factor),
            ("squat_hip_knee_ratio", self.squat_hip_knee_ratio),
            ("torso_overall_ratio", self.torso_overall_ratio),
            ("min_torso_px", self.min_torso_px),
            ("torso_epsilon", self.torso_epsilon),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(PostureError::ConfigError(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PostureThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Scalar measurements the rules are evaluated on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMeasurements {
    pub shoulder_avg_y: f32,
    pub hip_avg_y: f32,
    pub knee_avg_y: f32,
    pub ankle_avg_y: f32,
    /// Shoulder-to-hip span after the stability floor is applied.
    pub torso_height: f32,
    pub hip_to_knee_vertical: f32,
    pub knee_to_ankle_vertical: f32,
    pub shoulder_to_ankle_vertical: f32,
    /// Never below 1.
    pub shoulder_width: f32,
    pub shoulder_y_align_diff: f32,
    pub hip_y_align_diff: f32,
}

impl BodyMeasurements {
    /// Derive measurements from a full COCO-17 sequence.
    ///
    /// Returns `None` when fewer than 17 keypoints are supplied.
    #[must_use]
    pub fn from_keypoints(keypoints: &[Keypoint], thresholds: &PostureThresholds) -> Option<Self> {
        if keypoints.len() < KeypointIndex::COUNT {
            return None;
        }
        let kp = |index: KeypointIndex| keypoints[index as usize];

        let l_shoulder = kp(KeypointIndex::LeftShoulder);
        let r_shoulder = kp(KeypointIndex::RightShoulder);
        let l_hip = kp(KeypointIndex::LeftHip);
        let r_hip = kp(KeypointIndex::RightHip);
        let l_knee = kp(KeypointIndex::LeftKnee);
        let r_knee = kp(KeypointIndex::RightKnee);
        let l_ankle = kp(KeypointIndex::LeftAnkle);
        let r_ankle = kp(KeypointIndex::RightAnkle);

        let shoulder_avg_y = (l_shoulder.y + r_shoulder.y) / 2.0;
        let hip_avg_y = (l_hip.y + r_hip.y) / 2.0;
        let knee_avg_y = (l_knee.y + r_knee.y) / 2.0;
        let ankle_avg_y = (l_ankle.y + r_ankle.y) / 2.0;

        let overall_height_approx = (l_shoulder.y.min(r_shoulder.y) - l_ankle.y.max(r_ankle.y)).abs();
        let mut torso_height = (hip_avg_y - shoulder_avg_y).abs();
        let unstable_below = (thresholds.torso_overall_ratio * overall_height_approx)
            .max(thresholds.min_torso_px);
        if torso_height < unstable_below {
            torso_height = torso_height.max(thresholds.min_torso_px);
        }

        Some(Self {
            shoulder_avg_y,
            hip_avg_y,
            knee_avg_y,
            ankle_avg_y,
            torso_height,
            hip_to_knee_vertical: (knee_avg_y - hip_avg_y).abs(),
            knee_to_ankle_vertical: (ankle_avg_y - knee_avg_y).abs(),
            shoulder_to_ankle_vertical: (ankle_avg_y - shoulder_avg_y).abs(),
            shoulder_width: (l_shoulder.x - r_shoulder.x).abs().max(1.0),
            shoulder_y_align_diff: (l_shoulder.y - r_shoulder.y).abs(),
            hip_y_align_diff: (l_hip.y - r_hip.y).abs(),
        })
    }

    fn is_lying(&self, t: &PostureThresholds) -> bool {
        let level = self.shoulder_y_align_diff < t.lying_alignment_ratio * self.torso_height
            && self.hip_y_align_diff < t.lying_alignment_ratio * self.torso_height;
        let wider_than_tall = self.shoulder_width > t.lying_width_ratio * self.shoulder_to_ankle_vertical;
        let compressed = self.shoulder_to_ankle_vertical < t.lying_compressed_ratio * self.torso_height
            && self.torso_height > t.lying_torso_width_ratio * self.shoulder_width;
        let not_too_tall =
            self.shoulder_to_ankle_vertical < t.lying_max_vertical_ratio * self.shoulder_width;

        level && (wider_than_tall || compressed) && not_too_tall
    }

    fn is_torso_upright(&self, t: &PostureThresholds) -> bool {
        self.shoulder_avg_y < self.hip_avg_y - t.torso_upright_ratio * self.torso_height
    }

    fn is_overall_upright(&self, t: &PostureThresholds) -> bool {
        self.shoulder_to_ankle_vertical > t.upright_min_aspect_ratio * self.shoulder_width
    }

    fn leg_segment_threshold(&self, t: &PostureThresholds) -> f32 {
        t.leg_segment_factor * self.torso_height
    }

    fn is_standing(&self, t: &PostureThresholds) -> bool {
        let threshold = self.leg_segment_threshold(t);
        let margin = t.standing_order_margin * self.torso_height;

        self.hip_to_knee_vertical > threshold
            && self.knee_to_ankle_vertical > threshold
            && self.knee_avg_y > self.hip_avg_y + margin
            && self.ankle_avg_y > self.knee_avg_y + margin
            && self.is_overall_upright(t)
    }

    fn is_sitting(&self, t: &PostureThresholds) -> bool {
        let threshold = self.leg_segment_threshold(t);

        self.hip_to_knee_vertical < threshold
            && self.knee_to_ankle_vertical > threshold
            && self.ankle_avg_y > self.knee_avg_y + t.sitting_shin_margin * self.torso_height
            && self.hip_avg_y < self.knee_avg_y + t.sitting_hip_knee_ratio * self.torso_height
            && self.is_overall_upright(t)
    }

    fn is_squatting(&self, t: &PostureThresholds) -> bool {
        let threshold = self.leg_segment_threshold(t);

        self.is_torso_upright(t)
            && self.is_overall_upright(t)
            && self.hip_to_knee_vertical < t.squat_thigh_factor * threshold
            && self.knee_to_ankle_vertical < threshold
            && self.hip_avg_y > self.knee_avg_y - t.squat_hip_knee_ratio * self.torso_height
    }
}

/// Classify a keypoint sequence with the default thresholds.
///
/// # Example
///
/// ```rust
/// use posture_inference::{Keypoint, PostureLabel, classify_posture};
///
/// let keypoints = vec![Keypoint::new(0.0, 0.0); 5];
/// assert_eq!(classify_posture(&keypoints), PostureLabel::UnknownFewKeypoints);
/// ```
#[must_use]
pub fn classify_posture(keypoints: &[Keypoint]) -> PostureLabel {
    classify_posture_with(keypoints, &PostureThresholds::DEFAULT)
}

/// Classify a keypoint sequence.
///
/// Rules are tried in order and the first match wins: lying, torso-upright
/// gate, standing, sitting, squatting/crouching, then `Unknown`.
#[must_use]
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn classify_posture_with(keypoints: &[Keypoint], thresholds: &PostureThresholds) -> PostureLabel {
    let Some(body) = BodyMeasurements::from_keypoints(keypoints, thresholds) else {
        return PostureLabel::UnknownFewKeypoints;
    };

    // NaN torso heights fail this comparison as well
    if !(body.torso_height > thresholds.torso_epsilon) {
        return PostureLabel::UnknownUnreliableTorso;
    }

    if body.is_lying(thresholds) {
        return PostureLabel::LyingDown;
    }

    if !body.is_torso_upright(thresholds) {
        return PostureLabel::UnknownTorsoNotUpright;
    }

    if body.is_standing(thresholds) {
        PostureLabel::Standing
    } else if body.is_sitting(thresholds) {
        PostureLabel::Sitting
    } else if body.is_squatting(thresholds) {
        PostureLabel::SquattingCrouching
    } else {
        PostureLabel::Unknown
    }
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Result types for heatmap decoding and posture classification.
//!
//! Keypoints live in original-image pixel space with Y increasing downward,
//! ordered by the COCO 17-point body layout.

use std::fmt;

use crate::posture::PostureLabel;

/// Timing information for pipeline phases (in milliseconds).
#[derive(Debug, Clone, Default)]
pub struct Speed {
    /// Time spent decoding heatmaps.
    pub decode: Option<f64>,
    /// Time spent classifying the posture.
    pub classify: Option<f64>,
    /// Time spent drawing the annotation.
    pub annotate: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance with decode and classify timings.
    #[must_use]
    pub const fn new(decode: f64, classify: f64) -> Self {
        Self {
            decode: Some(decode),
            classify: Some(classify),
            annotate: None,
        }
    }

    /// Get total time across all recorded phases.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.decode.unwrap_or(0.0) + self.classify.unwrap_or(0.0) + self.annotate.unwrap_or(0.0)
    }
}

/// COCO 17-point body layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointIndex {
    /// Number of keypoints in the layout.
    pub const COUNT: usize = 17;

    /// All keypoints in channel order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Look up a keypoint by channel index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Snake-case joint name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

impl fmt::Display for KeypointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single decoded keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keypoint {
    /// X coordinate in original-image pixels.
    pub x: f32,
    /// Y coordinate in original-image pixels (grows downward).
    pub y: f32,
    /// Peak heatmap value the coordinate was taken from.
    pub confidence: f32,
}

impl Keypoint {
    /// Create a keypoint with full confidence.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            confidence: 1.0,
        }
    }

    /// Create a keypoint with an explicit confidence.
    #[must_use]
    pub const fn with_confidence(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// Round to integer pixel coordinates for drawing.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_pixel(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// Output of one decode + classify pass.
#[derive(Debug, Clone)]
pub struct PoseResult {
    /// One keypoint per heatmap channel, in channel order.
    pub keypoints: Vec<Keypoint>,
    /// Posture label computed from `keypoints`.
    pub label: PostureLabel,
    /// Original image shape (width, height).
    pub orig_size: (u32, u32),
    /// Timing information.
    pub speed: Speed,
}

impl PoseResult {
    /// Create a new result.
    #[must_use]
    pub const fn new(
        keypoints: Vec<Keypoint>,
        label: PostureLabel,
        orig_size: (u32, u32),
        speed: Speed,
    ) -> Self {
        Self {
            keypoints,
            label,
            orig_size,
            speed,
        }
    }

    /// Number of decoded keypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    /// Whether no keypoints were decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Keypoint by COCO name, if the sequence is long enough.
    #[must_use]
    pub fn get(&self, index: KeypointIndex) -> Option<&Keypoint> {
        self.keypoints.get(index as usize)
    }

    /// Channel indices whose peak confidence is below `threshold`.
    ///
    /// The classifier does not look at confidence; this is for reporting only.
    #[must_use]
    pub fn weak_keypoints(&self, threshold: f32) -> Vec<usize> {
        self.keypoints
            .iter()
            .enumerate()
            .filter(|(_, kp)| kp.confidence.is_nan() || kp.confidence < threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Keypoint coordinates normalized by the original image size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn xyn(&self) -> Vec<[f32; 2]> {
        let (w, h) = (self.orig_size.0 as f32, self.orig_size.1 as f32);
        self.keypoints
            .iter()
            .map(|kp| [kp.x / w.max(1.0), kp.y / h.max(1.0)])
            .collect()
    }

    /// One-line summary, e.g. `17 keypoints, Standing, 0.4ms`.
    #[must_use]
    pub fn verbose(&self) -> String {
        format!(
            "{} keypoints, {}, {:.1}ms",
            self.keypoints.len(),
            self.label,
            self.speed.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_index_count() {
        assert_eq!(KeypointIndex::COUNT, 17);
        assert_eq!(KeypointIndex::ALL.len(), KeypointIndex::COUNT);
    }

    #[test]
    fn test_keypoint_index_from_index() {
        assert_eq!(KeypointIndex::from_index(0), Some(KeypointIndex::Nose));
        assert_eq!(KeypointIndex::from_index(16), Some(KeypointIndex::RightAnkle));
        assert_eq!(KeypointIndex::from_index(17), None);
        for (i, kp) in KeypointIndex::ALL.iter().enumerate() {
            assert_eq!(*kp as usize, i);
        }
    }

    #[test]
    fn test_keypoint_to_pixel() {
        let kp = Keypoint::new(10.4, 20.6);
        assert_eq!(kp.to_pixel(), (10, 21));
    }

    #[test]
    fn test_speed() {
        let mut speed = Speed::new(1.0, 0.5);
        speed.annotate = Some(2.0);
        assert!((speed.total() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_weak_keypoints() {
        let keypoints = vec![
            Keypoint::with_confidence(0.0, 0.0, 0.9),
            Keypoint::with_confidence(0.0, 0.0, 0.1),
            Keypoint::with_confidence(0.0, 0.0, f32::NAN),
        ];
        let result = PoseResult::new(keypoints, PostureLabel::Unknown, (100, 100), Speed::default());
        assert_eq!(result.weak_keypoints(0.3), vec![1, 2]);
    }

    #[test]
    fn test_xyn() {
        let result = PoseResult::new(
            vec![Keypoint::new(320.0, 120.0)],
            PostureLabel::Standing,
            (640, 480),
            Speed::default(),
        );
        let xyn = result.xyn();
        assert!((xyn[0][0] - 0.5).abs() < 1e-6);
        assert!((xyn[0][1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_result_verbose() {
        let result = PoseResult::new(
            vec![Keypoint::default(); 17],
            PostureLabel::Sitting,
            (640, 480),
            Speed::new(0.25, 0.25),
        );
        assert_eq!(result.verbose(), "17 keypoints, Sitting, 0.5ms");
        assert_eq!(result.get(KeypointIndex::RightAnkle), Some(&Keypoint::default()));
    }
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Posture Inference Library
//!
//! Turn the keypoint heatmaps of a top-down pose model into body keypoints,
//! a posture label and an annotated image.
//!
//! ## Features
//!
//! - **Heatmap decoding** - Per-channel argmax with cell-center scaling back to the original image
//! - **Posture classification** - Rule-based Standing / Sitting / Lying Down / Squatting labels from COCO-17 keypoints
//! - **Annotation** - Skeleton, joints and a label banner drawn with `imageproc`
//! - **Scale invariant** - Every rule is a ratio of torso height or shoulder width
//!
//! ## Quick Start (Library)
//!
//! ```rust
//! use ndarray::Array4;
//! use posture_inference::{PostureConfig, PosturePipeline};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Heatmaps from a pose model: [1, 17, 64, 48]
//!     let heatmaps = Array4::<f32>::zeros((1, 17, 64, 48));
//!
//!     let pipeline = PosturePipeline::new(PostureConfig::new())?;
//!     let result = pipeline.analyze(&heatmaps.view().into_dyn(), 480, 640)?;
//!
//!     println!("{}", result.verbose());
//!     assert_eq!(result.keypoints.len(), 17);
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Decode a raw f32 heatmap dump and annotate the source image
//! posture-inference annotate --image person.jpg --heatmap person.f32
//!
//! # Different heatmap resolution and a custom label font
//! posture-inference annotate -i person.jpg --heatmap person.f32 --shape 1,17,96,72 --font Arial.ttf
//! ```
//!
//! **CLI Options:**
//!
//! | Option | Short | Description | Default |
//! |--------|-------|-------------|---------|
//! | `--image` | `-i` | Original image | required |
//! | `--heatmap` | | Raw little-endian f32 heatmap file | required |
//! | `--shape` | | Heatmap tensor shape | `1,17,64,48` |
//! | `--output-size` | | Heatmap `W,H` used for scaling | tensor size |
//! | `--marker-ratio` | | Joint radius / mean image side | `0.005` |
//! | `--font` | | Label font | cached `Arial.ttf` |
//! | `--save-dir` | | Output base directory | `runs/posture` |
//! | `--weak-conf` | | Low-confidence keypoint warning level | `0.3` |
//!
//! ## Custom Configuration
//!
//! ```rust
//! use posture_inference::{AnnotateStyle, PostureConfig, PostureThresholds};
//!
//! let config = PostureConfig::new()
//!     .with_thresholds(PostureThresholds::new().with_leg_segment_factor(0.35))
//!     .with_style(AnnotateStyle::new().with_label_scale(32.0))
//!     .with_output_size(48, 64);
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`postprocessing`] | Heatmap decoding ([`decode_heatmaps`]) |
//! | [`posture`] | Posture rules ([`classify_posture`], [`PostureThresholds`]) |
//! | [`results`] | Output types ([`Keypoint`], [`PoseResult`], [`Speed`]) |
//! | [`config`] | [`PostureConfig`] and [`AnnotateStyle`] |
//! | [`pipeline`] | [`PosturePipeline`] tying decode, classify and annotate together |
//! | [`visualizer`] | Skeleton topology and palette |
//! | [`io`] | Raw heatmap files and image saving |
//! | [`error`] | Error types ([`PostureError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `annotate` | Image annotation, font download and the CLI binary (default) |
//!
//! ## License
//!
//! This project is licensed under [AGPL-3.0](https://ultralytics.com/license).

// Modules
#[cfg(feature = "annotate")]
pub mod annotate;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod postprocessing;
pub mod posture;
pub mod results;
pub mod visualizer;

// Re-export main types for convenience
pub use config::{AnnotateStyle, PostureConfig};
pub use error::{PostureError, Result};
pub use pipeline::PosturePipeline;
pub use postprocessing::{decode_heatmaps, decode_heatmaps_expecting};
pub use posture::{
    BodyMeasurements, PostureLabel, PostureThresholds, classify_posture, classify_posture_with,
};
pub use results::{Keypoint, KeypointIndex, PoseResult, Speed};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "posture-inference");
    }
}

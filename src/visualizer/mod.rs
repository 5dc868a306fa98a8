// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Static drawing tables: the COCO skeleton and color palettes.

/// Color definitions and palettes.
pub mod color;

/// Keypoint connection table.
pub mod skeleton;

pub use color::Color;
pub use skeleton::SKELETON;

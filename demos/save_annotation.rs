// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Example script demonstrating how to decode heatmaps and save an annotated image.
//!
//! This example covers:
//! 1. Building a synthetic `[1, 17, 64, 48]` heatmap tensor for a standing person.
//! 2. Decoding and classifying it with `PosturePipeline`.
//! 3. Drawing the skeleton and label onto a blank canvas and saving it.

use image::{DynamicImage, RgbImage};
use ndarray::Array4;
use posture_inference::io::save_image;
use posture_inference::{PostureConfig, PosturePipeline, Result};

/// Heatmap cell (row, col) of every COCO keypoint for an upright figure.
const STANDING_CELLS: [(usize, usize); 17] = [
    (8, 24),
    (7, 23),
    (7, 25),
    (8, 22),
    (8, 26),
    (10, 21),
    (10, 27),
    (15, 20),
    (15, 28),
    (20, 20),
    (20, 28),
    (20, 22),
    (20, 26),
    (30, 22),
    (30, 26),
    (40, 22),
    (40, 26),
];

fn main() -> Result<()> {
    // 1. Synthetic heatmaps with a single hot cell per channel
    let mut heatmaps = Array4::<f32>::zeros((1, 17, 64, 48));
    for (k, &(row, col)) in STANDING_CELLS.iter().enumerate() {
        heatmaps[[0, k, row, col]] = 0.9;
    }

    // 2. Decode and classify for a 480x640 image
    let pipeline = PosturePipeline::new(PostureConfig::new().with_marker_ratio(0.01))?.load_font()?;
    let mut result = pipeline.analyze(&heatmaps.view().into_dyn(), 480, 640)?;
    println!("{}", result.verbose());

    // 3. Annotate and save
    let mut canvas = RgbImage::new(480, 640);
    pipeline.draw(&mut canvas, &mut result);
    let saved = save_image(&DynamicImage::ImageRgb8(canvas), "runs/demo/standing.png")?;
    println!("Saved annotated image to {}", saved.display());

    Ok(())
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::Path;
use std::process;

use crate::annotate::{find_next_run_dir, load_image};
use crate::cli::args::AnnotateArgs;
use crate::config::PostureConfig;
use crate::error::{PostureError, Result};
use crate::io::{parse_dims, read_heatmap, save_image};
use crate::pipeline::PosturePipeline;
use crate::results::{KeypointIndex, PoseResult};
use crate::{VERSION, error, info, section, success, verbose, warn};

/// Run the annotate command, exiting with code 1 on failure.
pub fn run_annotate(args: &AnnotateArgs) {
    if let Err(e) = try_annotate(args) {
        error!("{e}");
        process::exit(1);
    }
}

fn try_annotate(args: &AnnotateArgs) -> Result<()> {
    let shape = parse_dims(&args.shape)?;
    let mut config = PostureConfig::new().with_marker_ratio(args.marker_ratio);
    if let Some(ref size) = args.output_size {
        let (width, height) = parse_output_size(size)?;
        config = config.with_output_size(width, height);
    }
    if let Some(ref font) = args.font {
        config = config.with_font_path(font);
    }

    verbose!("Posture Inference {VERSION} 🚀 heatmap shape {shape:?}");

    let image = load_image(&args.image)?;
    let heatmaps = read_heatmap(&args.heatmap, &shape)?;
    let pipeline = PosturePipeline::new(config)?.load_font()?;

    let mut result = pipeline.analyze(&heatmaps.view(), image.width(), image.height())?;

    let weak = result.weak_keypoints(args.weak_conf);
    if !weak.is_empty() {
        warn!(
            "{} keypoint(s) below confidence {}: {}",
            weak.len(),
            args.weak_conf,
            format_keypoint_names(&weak)
        );
    }

    section!("Keypoints");
    for (i, kp) in result.keypoints.iter().enumerate() {
        let name = KeypointIndex::from_index(i).map_or_else(|| format!("#{i}"), |k| k.to_string());
        verbose!("  {name:<15} ({:7.1}, {:7.1})  conf {:.3}", kp.x, kp.y, kp.confidence);
    }

    let mut canvas = image.to_rgb8();
    pipeline.draw(&mut canvas, &mut result);
    let annotated = image::DynamicImage::ImageRgb8(canvas);

    let save_dir = find_next_run_dir(&args.save_dir, "predict");
    let file_name = Path::new(&args.image)
        .file_name()
        .map_or_else(|| "annotated.jpg".into(), |n| n.to_string_lossy().to_string());
    let saved = save_image(&annotated, Path::new(&save_dir).join(file_name))?;

    info!("{}: {}", args.image, format_pose_summary(&result));
    verbose!(
        "Speed: {:.1}ms decode, {:.1}ms classify, {:.1}ms annotate",
        result.speed.decode.unwrap_or(0.0),
        result.speed.classify.unwrap_or(0.0),
        result.speed.annotate.unwrap_or(0.0)
    );
    success!("Results saved to {}", saved.display());
    Ok(())
}

/// Parse a `W,H` output size.
fn parse_output_size(s: &str) -> Result<(usize, usize)> {
    match parse_dims(s)?.as_slice() {
        &[width, height] => Ok((width, height)),
        _ => Err(PostureError::ConfigError(format!(
            "--output-size expects W,H, got '{s}'"
        ))),
    }
}

fn format_keypoint_names(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&i| KeypointIndex::from_index(i).map_or_else(|| format!("#{i}"), |k| k.to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a one-line result summary, e.g. `480x640 Standing, 17 keypoints`.
pub fn format_pose_summary(result: &PoseResult) -> String {
    format!(
        "{}x{} {}, {} keypoints",
        result.orig_size.0,
        result.orig_size.1,
        result.label,
        result.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posture::PostureLabel;
    use crate::results::{Keypoint, Speed};

    #[test]
    fn test_parse_output_size() {
        assert_eq!(parse_output_size("48,64").unwrap(), (48, 64));
        assert!(parse_output_size("48").is_err());
        assert!(parse_output_size("1,2,3").is_err());
        assert!(parse_output_size("a,b").is_err());
    }

    #[test]
    fn test_format_keypoint_names() {
        assert_eq!(format_keypoint_names(&[0, 16]), "nose, right_ankle");
        assert_eq!(format_keypoint_names(&[20]), "#20");
    }

    #[test]
    fn test_format_pose_summary() {
        let result = PoseResult::new(
            vec![Keypoint::default(); 17],
            PostureLabel::LyingDown,
            (640, 480),
            Speed::default(),
        );
        assert_eq!(format_pose_summary(&result), "640x480 Lying Down, 17 keypoints");
    }
}

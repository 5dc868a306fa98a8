// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Drawing of keypoints, skeleton edges and the posture label.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut, text_size};

use crate::config::AnnotateStyle;
use crate::error::{PostureError, Result};
use crate::posture::PostureLabel;
use crate::results::Keypoint;
use crate::visualizer::Color;
use crate::visualizer::skeleton::{keypoint_color, limb_color, valid_connections};
use crate::{verbose, warn};

/// Assets URL for downloading fonts
const ASSETS_URL: &str = "https://github.com/ultralytics/assets/releases/download/v0.0.0";

/// Default label font.
pub const DEFAULT_FONT: &str = "Arial.ttf";

/// Label text color.
const LABEL_COLOR: Color = Color::WHITE;

/// Label banner color, blended with `AnnotateStyle::banner_alpha`.
const BANNER_COLOR: Color = Color::BLACK;

/// Find the next available run directory (predict, predict2, predict3, etc.)
pub fn find_next_run_dir(base: &str, prefix: &str) -> String {
    let base_path = Path::new(base);

    let first = base_path.join(prefix);
    if !first.exists() {
        return first.to_string_lossy().to_string();
    }

    for i in 2.. {
        let numbered = base_path.join(format!("{prefix}{i}"));
        if !numbered.exists() {
            return numbered.to_string_lossy().to_string();
        }
    }

    base_path.join(prefix).to_string_lossy().to_string()
}

/// Load an image, decoding JPEGs with `jpeg-decoder` and falling back to `image::open`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    if let Some("jpg" | "jpeg") = ext.as_deref() {
        if let Some(image) = decode_jpeg(path) {
            return Ok(image);
        }
    }

    image::open(path).map_err(|e| {
        PostureError::ImageError(format!("Failed to open {}: {e}", path.display()))
    })
}

fn decode_jpeg(path: &Path) -> Option<DynamicImage> {
    let file = File::open(path).ok()?;
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
    let pixels = decoder.decode().ok()?;
    let info = decoder.info()?;
    let (width, height) = (u32::from(info.width), u32::from(info.height));

    match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => {
            image::ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
        }
        jpeg_decoder::PixelFormat::L8 => {
            image::ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8)
        }
        _ => None,
    }
}

/// Check if font exists locally or download it.
///
/// Fonts are cached in the user config directory.
pub fn check_font(font: &str) -> Option<PathBuf> {
    let font_name = Path::new(font).file_name()?.to_string_lossy();
    let config_dir = dirs::config_dir()?.join("PostureInference");
    let font_path = config_dir.join(font_name.as_ref());

    if font_path.exists() {
        return Some(font_path);
    }

    if let Err(e) = fs::create_dir_all(&config_dir) {
        warn!("Failed to create config directory: {e}");
        return None;
    }

    let url = format!("{ASSETS_URL}/{font_name}");
    verbose!("Downloading {url} to {}", font_path.display());

    match ureq::get(&url).call() {
        Ok(response) => {
            let mut file = match File::create(&font_path) {
                Ok(f) => f,
                Err(e) => {
                    warn!("Failed to create font file: {e}");
                    return None;
                }
            };

            let mut reader = response.into_body().into_reader();
            if let Err(e) = io::copy(&mut reader, &mut file) {
                warn!("Failed to download font: {e}");
                let _ = fs::remove_file(&font_path);
                return None;
            }

            Some(font_path)
        }
        Err(e) => {
            warn!("Failed to download font from {url}: {e}");
            None
        }
    }
}

/// Load a TrueType/OpenType font from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid font.
pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontArc> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|e| {
        PostureError::FontError(format!("Failed to read font {}: {e}", path.display()))
    })?;
    FontArc::try_from_vec(data)
        .map_err(|e| PostureError::FontError(format!("Invalid font {}: {e}", path.display())))
}

/// Joint marker size for an image: `max(2, ratio × (width + height) / 2)`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn marker_size(width: u32, height: u32, ratio: f32) -> i32 {
    let size = ratio * (width as f32 + height as f32) / 2.0;
    (size as i32).max(2)
}

/// Skeleton line thickness for a marker size: `max(1, marker / 2)`.
#[must_use]
pub const fn line_thickness(marker: i32) -> i32 {
    let half = marker / 2;
    if half > 1 { half } else { 1 }
}

/// Draw a line segment `thickness` pixels wide by stacking parallel 1px segments.
#[allow(clippy::cast_precision_loss)]
pub fn draw_thick_line(
    img: &mut RgbImage,
    start: (f32, f32),
    end: (f32, f32),
    thickness: i32,
    color: Rgb<u8>,
) {
    if !(start.0 - end.0).hypot(start.1 - end.1).is_finite() {
        return;
    }
    let (img_w, img_h) = img.dimensions();
    let margin = thickness.max(1) as f32 + 1.0;
    let bounds = (-margin, -margin, img_w as f32 + margin, img_h as f32 + margin);
    let Some((start, end)) = clip_segment(start, end, bounds) else {
        return;
    };

    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let length = dx.hypot(dy);
    if length < f32::EPSILON || thickness <= 1 {
        draw_line_segment_mut(img, start, end, color);
        return;
    }

    // Unit normal to the segment
    let (nx, ny) = (-dy / length, dx / length);
    let center = (thickness - 1) as f32 / 2.0;
    for t in 0..thickness {
        let offset = t as f32 - center;
        let (ox, oy) = (nx * offset, ny * offset);
        draw_line_segment_mut(
            img,
            (start.0 + ox, start.1 + oy),
            (end.0 + ox, end.1 + oy),
            color,
        );
    }
}

/// Clip a segment to `(x_min, y_min, x_max, y_max)` (Liang-Barsky).
///
/// Returns `None` when no part of the segment lies inside the rectangle.
/// Computed in `f64` so far-away endpoints keep sub-pixel precision.
#[allow(clippy::cast_possible_truncation)]
fn clip_segment(
    start: (f32, f32),
    end: (f32, f32),
    (x_min, y_min, x_max, y_max): (f32, f32, f32, f32),
) -> Option<((f32, f32), (f32, f32))> {
    let (sx, sy) = (f64::from(start.0), f64::from(start.1));
    let (dx, dy) = (f64::from(end.0) - sx, f64::from(end.1) - sy);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for (p, q) in [
        (-dx, sx - f64::from(x_min)),
        (dx, f64::from(x_max) - sx),
        (-dy, sy - f64::from(y_min)),
        (dy, f64::from(y_max) - sy),
    ] {
        if p.abs() < f64::EPSILON {
            // Parallel to this edge
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        ((sx + t0 * dx) as f32, (sy + t0 * dy) as f32),
        ((sx + t1 * dx) as f32, (sy + t1 * dy) as f32),
    ))
}

/// Alpha-blend a filled rectangle onto the image, clipped to its bounds.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]
pub fn blend_rect(
    img: &mut RgbImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: Rgb<u8>,
    alpha: f32,
) {
    let (img_w, img_h) = img.dimensions();
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (i64::from(x) + i64::from(width)).min(i64::from(img_w)) as i32;
    let y1 = (i64::from(y) + i64::from(height)).min(i64::from(img_h)) as i32;
    let alpha = alpha.clamp(0.0, 1.0);

    for py in y0..y1 {
        for px in x0..x1 {
            let pixel = img.get_pixel_mut(px as u32, py as u32);
            for c in 0..3 {
                let blended =
                    f32::from(pixel[c]).mul_add(1.0 - alpha, f32::from(color[c]) * alpha);
                pixel[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Draw the label on a semi-transparent banner at the style's offset.
#[allow(clippy::cast_sign_loss)]
pub fn draw_label(img: &mut RgbImage, text: &str, font: &FontArc, style: &AnnotateStyle) {
    let scale = PxScale::from(style.label_scale);
    let (text_w, text_h) = text_size(scale, font, text);
    let (x, y) = style.label_offset;
    let pad = style.label_padding.max(0);

    blend_rect(
        img,
        x,
        y,
        text_w + 2 * pad as u32,
        text_h + 2 * pad as u32,
        BANNER_COLOR.to_rgb(),
        style.banner_alpha,
    );
    draw_text_mut(img, LABEL_COLOR.to_rgb(), x + pad, y + pad, scale, font, text);
}

/// Draw a pose and its label onto an image buffer in place.
///
/// Skeleton edges from `style.connections` are drawn first, skipping pairs
/// that index past the end of `keypoints`. A filled circle is then drawn at
/// every keypoint, and finally the label banner if a font is available.
/// Calling this twice on the same buffer draws everything twice.
#[allow(clippy::cast_possible_wrap)]
pub fn draw_pose(
    img: &mut RgbImage,
    keypoints: &[Keypoint],
    label: PostureLabel,
    font: Option<&FontArc>,
    style: &AnnotateStyle,
) {
    let (width, height) = img.dimensions();
    let marker = marker_size(width, height, style.marker_ratio);
    let thickness = line_thickness(marker);

    for (i, start, end) in valid_connections(style.connections, keypoints.len()) {
        let (a, b) = (keypoints[start], keypoints[end]);
        draw_thick_line(img, (a.x, a.y), (b.x, b.y), thickness, limb_color(i).to_rgb());
    }

    for (i, kp) in keypoints.iter().enumerate() {
        let (x, y) = kp.to_pixel();
        // Circles entirely off the image draw nothing
        if x < -marker || y < -marker || x > width as i32 + marker || y > height as i32 + marker {
            continue;
        }
        draw_filled_circle_mut(img, (x, y), marker, keypoint_color(i).to_rgb());
    }

    if let Some(font) = font {
        draw_label(img, label.as_str(), font, style);
    }
}

/// Annotate a copy of an image with a pose and its label.
#[must_use]
pub fn annotate_image(
    image: &DynamicImage,
    keypoints: &[Keypoint],
    label: PostureLabel,
    font: Option<&FontArc>,
    style: &AnnotateStyle,
) -> DynamicImage {
    let mut img = image.to_rgb8();
    draw_pose(&mut img, keypoints, label, font, style);
    DynamicImage::ImageRgb8(img)
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! I/O utilities for heatmap tensors and annotated images.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use ndarray::{Array4, ArrayD, IxDyn};

use crate::error::{PostureError, Result};

/// Parse a comma-separated list of dimensions, e.g. `"1,17,64,48"`.
///
/// # Errors
///
/// Returns [`PostureError::ConfigError`] for empty or non-numeric entries.
pub fn parse_dims(s: &str) -> Result<Vec<usize>> {
    s.split(',')
        .map(|part| {
            part.trim().parse::<usize>().map_err(|e| {
                PostureError::ConfigError(format!("Invalid dimension '{part}' in '{s}': {e}"))
            })
        })
        .collect()
}

/// Decode little-endian `f32` bytes into a tensor of the given shape.
///
/// # Errors
///
/// Returns an error if the byte count is not `4 × product(shape)`.
pub fn heatmap_from_le_bytes(bytes: &[u8], shape: &[usize]) -> Result<ArrayD<f32>> {
    let count = shape.iter().try_fold(1_usize, |acc, &d| acc.checked_mul(d)).ok_or_else(|| {
        PostureError::InvalidTensor(format!("Heatmap shape {shape:?} overflows"))
    })?;
    let expected = count.checked_mul(4).ok_or_else(|| {
        PostureError::InvalidTensor(format!("Heatmap shape {shape:?} overflows"))
    })?;

    if bytes.len() != expected {
        return Err(PostureError::InvalidTensor(format!(
            "Heatmap data has {} bytes, shape {shape:?} needs {expected}",
            bytes.len()
        )));
    }

    let values: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok(ArrayD::from_shape_vec(IxDyn(shape), values)?)
}

/// Read a raw little-endian `f32` heatmap file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its size does not match `shape`.
pub fn read_heatmap<P: AsRef<Path>>(path: P, shape: &[usize]) -> Result<ArrayD<f32>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        PostureError::IoError(format!("Failed to read heatmap {}: {e}", path.display()))
    })?;
    heatmap_from_le_bytes(&bytes, shape)
}

/// Write a 4D heatmap as raw little-endian `f32` values in logical order.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_heatmap<P: AsRef<Path>>(path: P, heatmaps: &Array4<f32>) -> Result<()> {
    let bytes: Vec<u8> = heatmaps.iter().flat_map(|v| v.to_le_bytes()).collect();
    fs::write(path.as_ref(), bytes).map_err(|e| {
        PostureError::IoError(format!(
            "Failed to write heatmap {}: {e}",
            path.as_ref().display()
        ))
    })
}

/// Save an image, creating the parent directory if needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the image cannot be encoded.
pub fn save_image<P: AsRef<Path>>(image: &DynamicImage, path: P) -> Result<PathBuf> {
    let output_path = path.as_ref().to_path_buf();

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            PostureError::IoError(format!(
                "Failed to create directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    image.save(&output_path).map_err(|e| {
        PostureError::ImageError(format!("Failed to save {}: {e}", output_path.display()))
    })?;
    Ok(output_path)
}

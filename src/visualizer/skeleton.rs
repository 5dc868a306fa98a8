// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use super::color::Color;

/// COCO-17 skeleton as `[start, end]` keypoint index pairs.
pub const SKELETON: [[usize; 2]; 19] = [
    [15, 13], // left ankle to left knee
    [13, 11], // left knee to left hip
    [16, 14], // right ankle to right knee
    [14, 12], // right knee to right hip
    [11, 12], // left hip to right hip
    [5, 11],  // left shoulder to left hip
    [6, 12],  // right shoulder to right hip
    [5, 6],   // left shoulder to right shoulder
    [5, 7],   // left shoulder to left elbow
    [6, 8],   // right shoulder to right elbow
    [7, 9],   // left elbow to left wrist
    [8, 10],  // right elbow to right wrist
    [1, 2],   // left eye to right eye
    [0, 1],   // nose to left eye
    [0, 2],   // nose to right eye
    [1, 3],   // left eye to left ear
    [2, 4],   // right eye to right ear
    [3, 5],   // left ear to left shoulder
    [4, 6],   // right ear to right shoulder
];

/// `POSE_COLORS` index per `SKELETON` entry (legs orange, torso pink, arms blue, face green).
const LIMB_COLOR_INDICES: [usize; 19] = [
    0, 0, 0, 0, 7, 7, 7, 9, 9, 9, 9, 9, 16, 16, 16, 16, 16, 16, 16,
];

/// `POSE_COLORS` index per keypoint.
const KPT_COLOR_INDICES: [usize; 17] = [16, 16, 16, 16, 16, 9, 9, 9, 9, 9, 9, 0, 0, 0, 0, 0, 0];

/// Color for the `i`-th connection of a table; wraps for tables longer than `SKELETON`.
#[must_use]
pub const fn limb_color(i: usize) -> Color {
    Color::from_pose_index(LIMB_COLOR_INDICES[i % LIMB_COLOR_INDICES.len()])
}

/// Color for keypoint channel `i`; channels past the COCO layout reuse the palette.
#[must_use]
pub const fn keypoint_color(i: usize) -> Color {
    Color::from_pose_index(KPT_COLOR_INDICES[i % KPT_COLOR_INDICES.len()])
}

/// Connections whose endpoints both exist in a sequence of `len` keypoints.
///
/// Yields `(table_position, start, end)`; out-of-range pairs are skipped.
pub fn valid_connections(
    connections: &[[usize; 2]],
    len: usize,
) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    connections
        .iter()
        .enumerate()
        .filter(move |(_, [start, end])| *start < len && *end < len)
        .map(|(i, [start, end])| (i, *start, *end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_indices_in_range() {
        assert!(SKELETON.iter().all(|[a, b]| *a < 17 && *b < 17));
        assert_eq!(valid_connections(&SKELETON, 17).count(), SKELETON.len());
    }

    #[test]
    fn test_valid_connections_skips_out_of_range() {
        let table = [[0, 1], [0, 20], [16, 5]];
        let kept: Vec<_> = valid_connections(&table, 17).collect();
        assert_eq!(kept, vec![(0, 0, 1), (2, 16, 5)]);
        assert_eq!(valid_connections(&table, 1).count(), 0);
    }

    #[test]
    fn test_colors() {
        assert_eq!(keypoint_color(0), Color::GREEN);
        assert_eq!(limb_color(0), Color::from_pose_index(0));
        assert_eq!(limb_color(19), limb_color(0));
    }
}

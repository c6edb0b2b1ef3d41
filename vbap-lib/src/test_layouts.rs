//! Loudspeaker layouts shared by unit tests.

use crate::geometry::Direction;

/// Elevation of a cube corner seen from the centre (degrees).
pub const CUBE_ELEVATION: f32 = 35.264_39;

pub fn cube() -> Vec<Direction> {
    let mut layout = Vec::with_capacity(8);
    for elevation in [CUBE_ELEVATION, -CUBE_ELEVATION] {
        for azimuth in [45.0, 135.0, -135.0, -45.0] {
            layout.push(Direction::new(azimuth, elevation));
        }
    }
    layout
}

pub fn octahedron() -> Vec<Direction> {
    vec![
        Direction::new(0.0, 0.0),
        Direction::new(90.0, 0.0),
        Direction::new(180.0, 0.0),
        Direction::new(-90.0, 0.0),
        Direction::new(0.0, 90.0),
        Direction::new(0.0, -90.0),
    ]
}

/// 5.0 surround on the horizontal plane plus a ring of four height
/// loudspeakers. Nothing covers the poles.
pub fn surround_with_heights() -> Vec<Direction> {
    vec![
        Direction::new(30.0, 0.0),
        Direction::new(-30.0, 0.0),
        Direction::new(0.0, 0.0),
        Direction::new(110.0, 0.0),
        Direction::new(-110.0, 0.0),
        Direction::new(45.0, 30.0),
        Direction::new(-45.0, 30.0),
        Direction::new(135.0, 30.0),
        Direction::new(-135.0, 30.0),
    ]
}

pub fn horizontal_ring(count: usize) -> Vec<Direction> {
    (0..count)
        .map(|i| Direction::horizontal(-180.0 + 360.0 * i as f32 / count as f32))
        .collect()
}

pub fn sum_of_squares(row: &[f32]) -> f32 {
    row.iter().map(|g| g * g).sum()
}

pub fn nonzero_columns(row: &[f32], threshold: f32) -> Vec<usize> {
    row.iter()
        .enumerate()
        .filter(|(_, g)| **g > threshold)
        .map(|(i, _)| i)
        .collect()
}

//! Per-group inversion of loudspeaker direction matrices.
//!
//! Each group matrix has the member unit vectors as its columns. Its inverse
//! maps a source unit vector straight to the group gains: `g = M * u`.

use cgmath::{Matrix2, Matrix3, SquareMatrix, Vector3};

use crate::constants::SINGULAR_DETERMINANT;
use crate::error::VbapError;
use crate::geometry::{unit_azimuth_to_cart, Direction};

/// Invert the 3x3 matrix of every loudspeaker triangle.
///
/// # Arguments
/// * `vertices` - Loudspeaker unit vectors.
/// * `groups` - Triangles as indices into `vertices`.
///
/// # Returns
/// One inverse per triangle, in the order of `groups`.
///
/// # Errors
/// Returns [`VbapError::SingularMatrix`] for a triangle whose loudspeakers
/// are (nearly) coplanar with the origin, and [`VbapError::DimensionMismatch`]
/// for an index outside `vertices`.
pub fn invert_ls_mtx_3d(
    vertices: &[Vector3<f32>],
    groups: &[[usize; 3]],
) -> Result<Vec<Matrix3<f32>>, VbapError> {
    let mut inverses = Vec::with_capacity(groups.len());
    for (group_index, group) in groups.iter().enumerate() {
        check_indices(group, vertices.len())?;
        let [a, b, c] = group.map(|index| vertices[index]);
        let matrix = Matrix3::from_cols(a, b, c);
        if matrix.determinant().abs() < SINGULAR_DETERMINANT {
            return Err(VbapError::SingularMatrix { group: group_index });
        }
        let inverse = matrix
            .invert()
            .ok_or(VbapError::SingularMatrix { group: group_index })?;
        inverses.push(inverse);
    }
    Ok(inverses)
}

/// Invert the 2x2 matrix of every loudspeaker pair.
///
/// Only the azimuth of each direction is used.
///
/// # Errors
/// Returns [`VbapError::SingularMatrix`] for a pair of coincident or
/// opposite loudspeakers.
pub fn invert_ls_mtx_2d(
    directions: &[Direction],
    pairs: &[[usize; 2]],
) -> Result<Vec<Matrix2<f32>>, VbapError> {
    let mut inverses = Vec::with_capacity(pairs.len());
    for (pair_index, pair) in pairs.iter().enumerate() {
        check_indices(pair, directions.len())?;
        let [a, b] = pair.map(|index| unit_azimuth_to_cart(directions[index].azimuth));
        let matrix = Matrix2::from_cols(a, b);
        if matrix.determinant().abs() < SINGULAR_DETERMINANT {
            return Err(VbapError::SingularMatrix { group: pair_index });
        }
        let inverse = matrix
            .invert()
            .ok_or(VbapError::SingularMatrix { group: pair_index })?;
        inverses.push(inverse);
    }
    Ok(inverses)
}

fn check_indices(group: &[usize], len: usize) -> Result<(), VbapError> {
    match group.iter().find(|&&index| index >= len) {
        Some(&index) => Err(VbapError::DimensionMismatch {
            expected: len,
            found: index + 1,
        }),
        None => Ok(()),
    }
}

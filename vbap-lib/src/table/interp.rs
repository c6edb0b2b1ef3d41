//! Amplitude normalisation of gain tables for interpolation.
//!
//! An interpolation table's rows sum to one, so a row can weight other
//! per-direction data (HRTF magnitudes, ITDs) without changing its level.

use crate::constants::NORM_EPSILON;
use crate::error::VbapError;

/// Divide every row of a row-major table by its sum, in place.
///
/// All-zero rows are left untouched.
///
/// # Errors
/// Returns [`VbapError::DimensionMismatch`] when `num_columns` is zero or
/// does not divide the table length.
pub fn gain_table_to_interp_table(gains: &mut [f32], num_columns: usize) -> Result<(), VbapError> {
    if num_columns == 0 || gains.len() % num_columns != 0 {
        return Err(VbapError::DimensionMismatch {
            expected: num_columns,
            found: gains.len(),
        });
    }
    normalize_rows(gains, num_columns);
    Ok(())
}

pub(crate) fn normalize_rows(gains: &mut [f32], num_columns: usize) {
    for row in gains.chunks_exact_mut(num_columns.max(1)) {
        let sum: f32 = row.iter().sum();
        if sum.abs() <= NORM_EPSILON {
            continue;
        }
        for gain in row.iter_mut() {
            *gain /= sum;
        }
    }
}

/// Weighted sum of rows of `data`, each `row_len` long.
///
/// # Errors
/// Returns [`VbapError::DimensionMismatch`] when `weights` and `indices`
/// differ in length or an index selects a row outside `data`.
pub fn interpolate_rows(
    weights: &[f32],
    indices: &[usize],
    data: &[f32],
    row_len: usize,
) -> Result<Vec<f32>, VbapError> {
    if weights.len() != indices.len() {
        return Err(VbapError::DimensionMismatch {
            expected: weights.len(),
            found: indices.len(),
        });
    }

    let mut out = vec![0.0; row_len];
    for (&weight, &index) in weights.iter().zip(indices) {
        if weight == 0.0 {
            continue;
        }
        let start = index * row_len;
        let row = data.get(start..start + row_len).ok_or(VbapError::DimensionMismatch {
            expected: data.len(),
            found: start + row_len,
        })?;
        for (acc, value) in out.iter_mut().zip(row) {
            *acc += weight * value;
        }
    }
    Ok(out)
}

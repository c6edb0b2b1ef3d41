//! Sparse three-gain representation of a dense gain table.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::COMPRESS_EPSILON;
use crate::error::VbapError;
use crate::table::interp::{interpolate_rows, normalize_rows};
use crate::table::GainTable;

/// Slots per compressed row.
pub const COMPRESSED_WIDTH: usize = 3;

/// At most three gains per row with their loudspeaker indices.
///
/// Gains are amplitude-normalised (each row sums to 1). Unused slots hold a
/// zero gain and index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedGainTable {
    pub gains: Vec<f32>,
    pub indices: Vec<usize>,
    pub num_rows: usize,
}

impl CompressedGainTable {
    pub fn row(&self, index: usize) -> Option<(&[f32], &[usize])> {
        if index >= self.num_rows {
            return None;
        }
        let span = index * COMPRESSED_WIDTH..(index + 1) * COMPRESSED_WIDTH;
        Some((self.gains.get(span.clone())?, self.indices.get(span)?))
    }

    /// Renormalise every row by its sum.
    pub fn into_interp_table(mut self) -> Self {
        normalize_rows(&mut self.gains, COMPRESSED_WIDTH);
        self
    }

    /// Weighted sum of per-loudspeaker data vectors for one row.
    ///
    /// `data` holds one vector of `data_len` values per loudspeaker.
    ///
    /// # Errors
    /// Returns an error when `index` is past the end or an index points
    /// outside `data`.
    pub fn interpolate(&self, index: usize, data: &[f32], data_len: usize) -> Result<Vec<f32>, VbapError> {
        let (weights, indices) = self.row(index).ok_or(VbapError::DimensionMismatch {
            expected: self.num_rows,
            found: index + 1,
        })?;
        interpolate_rows(weights, indices, data, data_len)
    }
}

/// Keep the gains above [`COMPRESS_EPSILON`] of every row.
///
/// A triangulated table has at most three such gains per row. Spread tables
/// may have more; those rows keep their three largest.
pub fn compress_gain_table_3d(table: &GainTable) -> CompressedGainTable {
    let mut gains = vec![0.0; table.num_sources * COMPRESSED_WIDTH];
    let mut indices = vec![0usize; table.num_sources * COMPRESSED_WIDTH];
    let mut truncated = 0usize;

    let slots = gains
        .chunks_exact_mut(COMPRESSED_WIDTH)
        .zip(indices.chunks_exact_mut(COMPRESSED_WIDTH));
    for (row, (gain_slots, index_slots)) in table.rows().zip(slots) {
        let mut kept: Vec<(usize, f32)> = row
            .iter()
            .enumerate()
            .filter(|(_, g)| **g > COMPRESS_EPSILON)
            .map(|(column, g)| (column, *g))
            .collect();
        if kept.len() > COMPRESSED_WIDTH {
            truncated += 1;
            kept.sort_by(|a, b| b.1.total_cmp(&a.1));
            kept.truncate(COMPRESSED_WIDTH);
            kept.sort_by_key(|&(column, _)| column);
        }

        let sum: f32 = kept.iter().map(|&(_, g)| g).sum();
        for (slot, (column, gain)) in kept.into_iter().enumerate() {
            gain_slots[slot] = gain / sum;
            index_slots[slot] = column;
        }
    }

    if truncated > 0 {
        debug!(
            "Compression kept the {} largest gains of {} rows.",
            COMPRESSED_WIDTH, truncated
        );
    }

    CompressedGainTable {
        gains,
        indices,
        num_rows: table.num_sources,
    }
}

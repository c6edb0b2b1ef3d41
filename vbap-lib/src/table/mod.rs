//! Dense gain tables and the builders that fill them.
//!
//! Rows are source directions and columns are the loudspeakers of the real
//! layout, in caller order. Every row of a builder-produced table is
//! energy-normalised or all zero.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::VbapError;
use crate::geometry::{wrap_azimuth, Direction};
use crate::panner::{VbapPanner, VbapPanner2d};
use crate::settings::VbapSettings;

pub mod compress;
pub mod interp;

pub use compress::{compress_gain_table_3d, CompressedGainTable};
pub use interp::{gain_table_to_interp_table, interpolate_rows};

/// Row-major gain table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainTable {
    pub gains: Vec<f32>,
    pub num_sources: usize,
    pub num_loudspeakers: usize,
    /// Triangles (3D) or pairs (2D) the table was solved against.
    pub num_groups: usize,
}

impl GainTable {
    /// Wrap a row-major gain buffer.
    ///
    /// # Errors
    /// Returns [`VbapError::DimensionMismatch`] when `gains` does not hold
    /// `num_sources * num_loudspeakers` values.
    pub fn from_gains(
        gains: Vec<f32>,
        num_sources: usize,
        num_loudspeakers: usize,
        num_groups: usize,
    ) -> Result<Self, VbapError> {
        let expected = num_sources * num_loudspeakers;
        if gains.len() != expected {
            return Err(VbapError::DimensionMismatch {
                expected,
                found: gains.len(),
            });
        }
        Ok(Self {
            gains,
            num_sources,
            num_loudspeakers,
            num_groups,
        })
    }

    pub fn gains(&self) -> &[f32] {
        &self.gains
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.num_sources {
            return None;
        }
        let start = index * self.num_loudspeakers;
        self.gains.get(start..start + self.num_loudspeakers)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.gains.chunks_exact(self.num_loudspeakers.max(1)).take(self.num_sources)
    }

    /// Compress to at most three amplitude-normalised gains per row.
    pub fn compress(&self) -> CompressedGainTable {
        compress_gain_table_3d(self)
    }

    /// Convert the table in place to amplitude-normalised rows.
    pub fn into_interp_table(mut self) -> Self {
        interp::normalize_rows(&mut self.gains, self.num_loudspeakers);
        self
    }
}

/// Regular source grid, elevation-major and azimuth-minor.
///
/// Azimuth runs from -180 to 180 and elevation from -90 to 90 (inclusive).
/// A horizontal grid has a single elevation row at 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceGrid {
    pub az_res_deg: f32,
    pub el_res_deg: f32,
    pub num_azimuths: usize,
    pub num_elevations: usize,
}

impl SourceGrid {
    /// Full-sphere grid.
    ///
    /// # Errors
    /// Returns [`VbapError::InvalidResolution`] unless `0 < az_res_deg <= 360`
    /// and `0 < el_res_deg <= 180`.
    pub fn new(az_res_deg: f32, el_res_deg: f32) -> Result<Self, VbapError> {
        if !valid_resolution(az_res_deg, 360.0) || !valid_resolution(el_res_deg, 180.0) {
            return Err(VbapError::InvalidResolution {
                azimuth: az_res_deg,
                elevation: el_res_deg,
            });
        }
        Ok(Self {
            az_res_deg,
            el_res_deg,
            num_azimuths: grid_count(360.0, az_res_deg),
            num_elevations: grid_count(180.0, el_res_deg),
        })
    }

    /// Grid on the horizontal plane only.
    pub fn horizontal(az_res_deg: f32) -> Result<Self, VbapError> {
        if !valid_resolution(az_res_deg, 360.0) {
            return Err(VbapError::InvalidResolution {
                azimuth: az_res_deg,
                elevation: 0.0,
            });
        }
        Ok(Self {
            az_res_deg,
            el_res_deg: 0.0,
            num_azimuths: grid_count(360.0, az_res_deg),
            num_elevations: 1,
        })
    }

    pub fn len(&self) -> usize {
        self.num_azimuths * self.num_elevations
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direction of grid point `index`, or `None` past the end.
    pub fn direction(&self, index: usize) -> Option<Direction> {
        if index >= self.len() {
            return None;
        }
        let azimuth = -180.0 + (index % self.num_azimuths) as f32 * self.az_res_deg;
        Some(Direction::new(azimuth, self.elevation(index / self.num_azimuths)))
    }

    pub fn directions(&self) -> Vec<Direction> {
        (0..self.len()).filter_map(|index| self.direction(index)).collect()
    }

    /// Index of the grid point nearest to a direction.
    ///
    /// Azimuth is wrapped to (-180, 180] first; elevation is clamped to the
    /// grid.
    pub fn index_of(&self, azimuth: f32, elevation: f32) -> usize {
        let azimuth = wrap_azimuth(azimuth);
        let az_index = (((azimuth + 180.0) / self.az_res_deg).round() as usize)
            .min(self.num_azimuths - 1);
        let el_index = if self.num_elevations == 1 {
            0
        } else {
            (((elevation.clamp(-90.0, 90.0) + 90.0) / self.el_res_deg).round() as usize)
                .min(self.num_elevations - 1)
        };
        el_index * self.num_azimuths + az_index
    }

    fn elevation(&self, el_index: usize) -> f32 {
        if self.num_elevations == 1 {
            0.0
        } else {
            (-90.0 + el_index as f32 * self.el_res_deg).min(90.0)
        }
    }
}

/// Points from one end of `span` to the other that never step past its end.
fn grid_count(span: f32, resolution: f32) -> usize {
    (span / resolution + 1e-4).floor() as usize + 1
}

fn valid_resolution(resolution: f32, max: f32) -> bool {
    resolution.is_finite() && resolution > 0.0 && resolution <= max
}

/// 3D gain table for an explicit list of source directions.
///
/// # Returns
/// `Ok(None)` when the layout cannot be triangulated.
///
/// # Errors
/// Returns an error for invalid inputs or a singular triangle matrix.
pub fn generate_gain_table_3d_srcs(
    sources: &[Direction],
    loudspeakers: &[Direction],
    settings: &VbapSettings,
) -> Result<Option<GainTable>, VbapError> {
    let Some(panner) = VbapPanner::new(loudspeakers, settings)? else {
        warn!(
            "Loudspeaker layout of {} directions has no valid triangles.",
            loudspeakers.len()
        );
        return Ok(None);
    };
    let gains = panner.gain_rows(sources)?;
    GainTable::from_gains(gains, sources.len(), panner.num_loudspeakers(), panner.num_groups()).map(Some)
}

/// 3D gain table over a regular [`SourceGrid`].
pub fn generate_gain_table_3d(
    loudspeakers: &[Direction],
    az_res_deg: f32,
    el_res_deg: f32,
    settings: &VbapSettings,
) -> Result<Option<GainTable>, VbapError> {
    let grid = SourceGrid::new(az_res_deg, el_res_deg)?;
    generate_gain_table_3d_srcs(&grid.directions(), loudspeakers, settings)
}

/// 2D gain table for an explicit list of source directions.
///
/// Only azimuths are used. A valid 2D layout always pairs, so `Ok(None)` is
/// never returned; the `Option` mirrors the 3D builders.
pub fn generate_gain_table_2d_srcs(
    sources: &[Direction],
    loudspeakers: &[Direction],
) -> Result<Option<GainTable>, VbapError> {
    let panner = VbapPanner2d::new(loudspeakers)?;
    let gains = panner.gain_rows(sources)?;
    GainTable::from_gains(gains, sources.len(), panner.num_loudspeakers(), panner.num_groups()).map(Some)
}

/// 2D gain table over a horizontal grid.
pub fn generate_gain_table_2d(
    loudspeakers: &[Direction],
    az_res_deg: f32,
) -> Result<Option<GainTable>, VbapError> {
    let grid = SourceGrid::horizontal(az_res_deg)?;
    generate_gain_table_2d_srcs(&grid.directions(), loudspeakers)
}

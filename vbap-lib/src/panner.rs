//! Precomputed panners: triangulation and inversion done once per layout.

use cgmath::{Matrix2, Matrix3};
use log::{debug, warn};

use crate::error::VbapError;
use crate::geometry::{validate_directions, Direction};
use crate::inversion::{invert_ls_mtx_2d, invert_ls_mtx_3d};
use crate::layout::AugmentedLayout;
use crate::settings::VbapSettings;
use crate::solver::{check_spread, solve_direction_2d, solve_direction_3d, vbap_2d, vbap_3d};
use crate::triangulation::{find_ls_pairs, find_ls_triplets};

/// 3D VBAP/MDAP panner for a fixed loudspeaker layout.
#[derive(Debug, Clone)]
pub struct VbapPanner {
    layout: AugmentedLayout,
    groups: Vec<[usize; 3]>,
    inverses: Vec<Matrix3<f32>>,
    spread_deg: f32,
}

impl VbapPanner {
    /// Triangulate and invert a loudspeaker layout.
    ///
    /// # Returns
    /// `Ok(None)` when the (possibly dummy-augmented) layout has no valid
    /// triangles, e.g. all loudspeakers on one plane through the origin.
    ///
    /// # Errors
    /// Returns an error for fewer than 3 loudspeakers, invalid directions,
    /// an invalid spread or a singular triangle matrix.
    pub fn new(loudspeakers: &[Direction], settings: &VbapSettings) -> Result<Option<Self>, VbapError> {
        if loudspeakers.len() < 3 {
            return Err(VbapError::TooFewLoudspeakers {
                required: 3,
                found: loudspeakers.len(),
            });
        }
        validate_directions(loudspeakers)?;
        check_spread(settings.spread_deg)?;

        let mut layout = AugmentedLayout::new(loudspeakers, settings.enable_dummies);
        let triangulation = find_ls_triplets(layout.directions(), &settings.triangulation)?;
        if triangulation.is_empty() {
            return Ok(None);
        }
        layout.attach_triangulation(&triangulation);

        let inverses = invert_ls_mtx_3d(&triangulation.vertices, &triangulation.groups)?;
        debug!(
            "Prepared VBAP panner: {} loudspeakers ({} augmented), {} triangles.",
            layout.num_real(),
            layout.num_augmented(),
            triangulation.len()
        );

        Ok(Some(Self {
            layout,
            groups: triangulation.groups,
            inverses,
            spread_deg: settings.spread_deg,
        }))
    }

    /// Number of real loudspeakers (gain row length).
    pub fn num_loudspeakers(&self) -> usize {
        self.layout.num_real()
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Triangles as indices into [`AugmentedLayout::directions`].
    pub fn groups(&self) -> &[[usize; 3]] {
        &self.groups
    }

    pub fn layout(&self) -> &AugmentedLayout {
        &self.layout
    }

    pub fn spread_deg(&self) -> f32 {
        self.spread_deg
    }

    /// Energy-normalised gains for a single direction.
    ///
    /// # Errors
    /// Returns an error for an invalid direction.
    pub fn gains(&self, direction: Direction) -> Result<Vec<f32>, VbapError> {
        validate_directions(&[direction])?;
        let mut augmented = vec![0.0; self.layout.num_augmented()];
        let mut out = vec![0.0; self.layout.num_real()];
        solve_direction_3d(direction, self.spread_deg, &self.groups, &self.inverses, &mut augmented)?;
        self.layout.project(&augmented, &mut out);
        Ok(out)
    }

    /// Energy-normalised gains for many directions, row-major.
    ///
    /// # Errors
    /// Returns an error for an invalid direction.
    pub fn gain_rows(&self, sources: &[Direction]) -> Result<Vec<f32>, VbapError> {
        validate_directions(sources)?;
        let augmented = vbap_3d(
            sources,
            self.layout.num_augmented(),
            &self.groups,
            &self.inverses,
            self.spread_deg,
        )?;

        let num_real = self.layout.num_real();
        let mut gains = vec![0.0; sources.len() * num_real];
        let mut empty = 0usize;
        for (aug_row, row) in augmented
            .chunks_exact(self.layout.num_augmented())
            .zip(gains.chunks_exact_mut(num_real))
        {
            if !self.layout.project(aug_row, row) {
                empty += 1;
            }
        }
        if empty > 0 {
            warn!("{} of {} gain rows are empty after projection.", empty, sources.len());
        }
        Ok(gains)
    }
}

/// 2D VBAP panner for a horizontal loudspeaker layout.
#[derive(Debug, Clone)]
pub struct VbapPanner2d {
    num_loudspeakers: usize,
    pairs: Vec<[usize; 2]>,
    inverses: Vec<Matrix2<f32>>,
}

impl VbapPanner2d {
    /// Pair and invert a horizontal layout. Elevations are ignored.
    ///
    /// # Errors
    /// Returns an error for fewer than 2 loudspeakers, invalid directions or
    /// a singular pair (coincident or opposite loudspeakers).
    pub fn new(loudspeakers: &[Direction]) -> Result<Self, VbapError> {
        let pairs = find_ls_pairs(loudspeakers)?;
        let inverses = invert_ls_mtx_2d(loudspeakers, &pairs)?;
        debug!(
            "Prepared 2D VBAP panner: {} loudspeakers, {} pairs.",
            loudspeakers.len(),
            pairs.len()
        );
        Ok(Self {
            num_loudspeakers: loudspeakers.len(),
            pairs,
            inverses,
        })
    }

    pub fn num_loudspeakers(&self) -> usize {
        self.num_loudspeakers
    }

    pub fn num_groups(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[[usize; 2]] {
        &self.pairs
    }

    pub fn gains(&self, direction: Direction) -> Result<Vec<f32>, VbapError> {
        validate_directions(&[direction])?;
        let mut out = vec![0.0; self.num_loudspeakers];
        solve_direction_2d(direction, &self.pairs, &self.inverses, &mut out);
        Ok(out)
    }

    pub fn gain_rows(&self, sources: &[Direction]) -> Result<Vec<f32>, VbapError> {
        validate_directions(sources)?;
        vbap_2d(sources, self.num_loudspeakers, &self.pairs, &self.inverses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_layouts::{cube, horizontal_ring, nonzero_columns, octahedron, sum_of_squares, surround_with_heights};

    #[test]
    fn coplanar_layout_has_no_panner() {
        let ring = horizontal_ring(8);
        let settings = VbapSettings {
            enable_dummies: false,
            ..VbapSettings::default()
        };
        assert!(VbapPanner::new(&ring, &settings).expect("panner").is_none());
    }

    #[test]
    fn dummies_make_horizontal_ring_pannable() {
        let ring = horizontal_ring(8);
        let panner = VbapPanner::new(&ring, &VbapSettings::default())
            .expect("panner")
            .expect("triangulated");
        assert_eq!(panner.num_loudspeakers(), 8);
        assert_eq!(panner.layout().num_augmented(), 10);
        assert_eq!(panner.num_groups(), 16);

        let gains = panner.gains(Direction::new(20.0, 40.0)).expect("gains");
        assert_eq!(gains.len(), 8);
        assert!((sum_of_squares(&gains) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn single_gain_matches_batch_rows() {
        let layout = surround_with_heights();
        let panner = VbapPanner::new(&layout, &VbapSettings::default().with_spread(20.0))
            .expect("panner")
            .expect("triangulated");
        let sources = vec![Direction::new(12.0, 5.0), Direction::new(-170.0, 60.0)];
        let rows = panner.gain_rows(&sources).expect("rows");
        for (source, row) in sources.iter().zip(rows.chunks(layout.len())) {
            let single = panner.gains(*source).expect("gains");
            for (a, b) in single.iter().zip(row) {
                assert!((a - b).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn cube_rows_use_three_loudspeakers() {
        let panner = VbapPanner::new(&cube(), &VbapSettings::default())
            .expect("panner")
            .expect("triangulated");
        assert_eq!(panner.num_groups(), 12);
        let gains = panner.gains(Direction::new(5.0, 10.0)).expect("gains");
        assert_eq!(nonzero_columns(&gains, 1e-6).len(), 3);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(
            VbapPanner::new(&octahedron()[..2], &VbapSettings::default()),
            Err(VbapError::TooFewLoudspeakers { .. })
        ));
        assert!(matches!(
            VbapPanner::new(&octahedron(), &VbapSettings::default().with_spread(200.0)),
            Err(VbapError::InvalidSpread(_))
        ));
        let panner = VbapPanner::new(&octahedron(), &VbapSettings::default())
            .expect("panner")
            .expect("triangulated");
        assert!(panner.gains(Direction::new(0.0, 100.0)).is_err());
    }

    #[test]
    fn panner_2d_covers_the_circle() {
        let panner = VbapPanner2d::new(&horizontal_ring(5)).expect("panner");
        assert_eq!(panner.num_groups(), 5);
        for step in 0..36 {
            let gains = panner
                .gains(Direction::horizontal(step as f32 * 10.0 - 180.0))
                .expect("gains");
            assert!((sum_of_squares(&gains) - 1.0).abs() < 1e-5);
            assert!(nonzero_columns(&gains, 1e-6).len() <= 2);
        }
    }
}

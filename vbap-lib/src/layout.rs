//! Loudspeaker layouts augmented with dummy loudspeakers at the poles.
//!
//! A layout without loudspeakers near a pole cannot be closed by its convex
//! hull. A dummy at the pole closes it; the dummy takes part in triangulation
//! and gain solving and is projected away afterwards through an explicit
//! index map.

use log::debug;

use crate::constants::ADD_DUMMY_LIMIT_DEG;
use crate::geometry::Direction;
use crate::solver::normalize_energy;
use crate::triangulation::Triangulation;

/// Energy below which a projected row counts as empty.
const EMPTY_ROW_ENERGY: f32 = 1e-12;

/// Which pole a dummy loudspeaker covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pole {
    North,
    South,
}

impl Pole {
    pub fn direction(self) -> Direction {
        match self {
            Pole::North => Direction::new(0.0, 90.0),
            Pole::South => Direction::new(0.0, -90.0),
        }
    }
}

/// Real loudspeakers followed by any dummies, with the mapping back to the
/// real layout.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedLayout {
    directions: Vec<Direction>,
    index_map: Vec<Option<usize>>,
    dummies: Vec<(usize, Pole)>,
    dummy_neighbours: Vec<Vec<usize>>,
    num_real: usize,
}

impl AugmentedLayout {
    /// Build the augmented layout.
    ///
    /// With `enable_dummies` set, a dummy is added at each pole that has no
    /// real loudspeaker within [`ADD_DUMMY_LIMIT_DEG`] of it.
    pub fn new(loudspeakers: &[Direction], enable_dummies: bool) -> Self {
        let mut directions = loudspeakers.to_vec();
        let mut index_map: Vec<Option<usize>> = (0..loudspeakers.len()).map(Some).collect();
        let mut dummies = Vec::new();

        if enable_dummies {
            let limit = 90.0 - ADD_DUMMY_LIMIT_DEG;
            let needs_north = loudspeakers.iter().all(|d| d.elevation <= limit);
            let needs_south = loudspeakers.iter().all(|d| d.elevation >= -limit);
            for (needed, pole) in [(needs_north, Pole::North), (needs_south, Pole::South)] {
                if needed {
                    debug!("Adding dummy loudspeaker at the {:?} pole.", pole);
                    dummies.push((directions.len(), pole));
                    directions.push(pole.direction());
                    index_map.push(None);
                }
            }
        }

        Self {
            dummy_neighbours: vec![Vec::new(); dummies.len()],
            directions,
            index_map,
            dummies,
            num_real: loudspeakers.len(),
        }
    }

    /// Directions of the real loudspeakers followed by the dummies.
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Real loudspeaker index for every augmented index (`None` for dummies).
    pub fn index_map(&self) -> &[Option<usize>] {
        &self.index_map
    }

    pub fn num_real(&self) -> usize {
        self.num_real
    }

    pub fn num_augmented(&self) -> usize {
        self.directions.len()
    }

    pub fn has_dummy(&self, pole: Pole) -> bool {
        self.dummies.iter().any(|&(_, p)| p == pole)
    }

    /// Augmented indices of the dummies.
    pub fn dummy_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.dummies.iter().map(|&(index, _)| index)
    }

    /// Record which real loudspeakers share a triangle with each dummy.
    pub fn attach_triangulation(&mut self, triangulation: &Triangulation) {
        for (slot, &(index, _)) in self.dummies.iter().enumerate() {
            self.dummy_neighbours[slot] = triangulation
                .neighbours(index)
                .into_iter()
                .filter_map(|neighbour| self.index_map.get(neighbour).copied().flatten())
                .collect();
        }
    }

    /// Project an augmented gain row onto the real layout.
    ///
    /// Dummy columns are dropped and the result is energy-normalised. When
    /// all of the row's energy sat on dummies, each dummy's gain is shared
    /// equally among its real neighbours first.
    ///
    /// Returns `false` when the projected row is all zero.
    pub fn project(&self, augmented_row: &[f32], out: &mut [f32]) -> bool {
        out.fill(0.0);
        for (gain, mapped) in augmented_row.iter().zip(&self.index_map) {
            if let Some(real) = *mapped {
                out[real] = *gain;
            }
        }

        let energy: f32 = out.iter().map(|g| g * g).sum();
        if energy < EMPTY_ROW_ENERGY {
            for (slot, &(index, _)) in self.dummies.iter().enumerate() {
                let gain = augmented_row.get(index).copied().unwrap_or(0.0);
                let neighbours = &self.dummy_neighbours[slot];
                if gain <= 0.0 || neighbours.is_empty() {
                    continue;
                }
                let share = gain / neighbours.len() as f32;
                for &real in neighbours {
                    out[real] += share;
                }
            }
        }

        normalize_energy(out)
    }
}

//! # VBAP Gain Tables
//!
//! This library computes vector-base amplitude panning (VBAP) and
//! multiple-direction amplitude panning (MDAP) gains for loudspeaker layouts.
//! It triangulates a layout, inverts one matrix per loudspeaker triangle (or
//! pair in 2D) and solves gains for explicit source lists or regular grids.
//! Dense tables can be compressed to three gains per row and renormalised
//! for interpolating other per-direction data.

pub mod constants;
#[cfg(feature = "bench")]
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod inversion;
pub mod layout;
pub mod panner;
pub mod presets;
pub mod pvalues;
pub mod settings;
pub mod solver;
pub mod table;
#[cfg(test)]
mod test_layouts;
pub mod triangulation;

pub use error::VbapError;
pub use geometry::Direction;
pub use layout::{AugmentedLayout, Pole};
pub use panner::{VbapPanner, VbapPanner2d};
pub use presets::LayoutPreset;
pub use pvalues::{get_p_values, normalize_gains_p};
pub use settings::{ConfigError, LayoutFile, VbapSettings};
pub use table::{
    compress_gain_table_3d, gain_table_to_interp_table, generate_gain_table_2d,
    generate_gain_table_2d_srcs, generate_gain_table_3d, generate_gain_table_3d_srcs,
    CompressedGainTable, GainTable, SourceGrid,
};
pub use triangulation::{find_ls_pairs, find_ls_triplets, Triangulation, TriangulationSettings};

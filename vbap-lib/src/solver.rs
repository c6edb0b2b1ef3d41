//! VBAP and MDAP gain solving against precomputed group inverses.

use cgmath::{InnerSpace, Matrix2, Matrix3, Rad, Rotation3, Vector3};
use log::warn;

use crate::constants::{
    GAIN_TOLERANCE, SPREAD_RINGS, SPREAD_RING_SOURCES, SPREAD_THRESHOLD_DEG,
};
use crate::error::VbapError;
use crate::geometry::{unit_azimuth_to_cart, Direction};

/// Elevation (degrees) beyond which a source counts as being at a pole when
/// building its spreading ring.
const POLE_ELEVATION_DEG: f32 = 89.427;

/// Auxiliary directions used to spread a source.
///
/// The ring lies on a cone of half-angle `spread_deg / 2` around the source.
/// It is generated by rotating a perpendicular base vector about the source
/// axis. The source direction itself is appended last.
///
/// # Errors
/// Returns [`VbapError::InvalidSpread`] unless `0 <= spread_deg < 180`.
pub fn spread_source_directions(
    direction: Direction,
    spread_deg: f32,
) -> Result<Vec<Vector3<f32>>, VbapError> {
    check_spread(spread_deg)?;
    let source = direction.to_unit_vector();

    let reference = if direction.elevation.abs() > POLE_ELEVATION_DEG {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };
    let rotation = Matrix3::from_axis_angle(
        source,
        Rad(std::f32::consts::TAU / SPREAD_RING_SOURCES as f32),
    );

    let mut ring = Vec::with_capacity(SPREAD_RING_SOURCES);
    let mut base = source.cross(reference).normalize();
    for _ in 0..SPREAD_RING_SOURCES {
        ring.push(base);
        base = rotation * base;
    }

    let ring_step = (spread_deg / 2.0).to_radians() / SPREAD_RINGS as f32;
    let mut out = Vec::with_capacity(SPREAD_RINGS * SPREAD_RING_SOURCES + 1);
    for ring_index in 0..SPREAD_RINGS {
        let tilt = ((ring_index + 1) as f32 * ring_step).tan();
        for &base in &ring {
            out.push((source + base * tilt).normalize());
        }
    }
    out.push(source);
    Ok(out)
}

/// Compute 3D VBAP gains for a list of source directions.
///
/// With `spread_deg` above [`SPREAD_THRESHOLD_DEG`] every source is replaced
/// by its spreading ring (MDAP). The contributions of every active
/// triangle for every ring direction are then summed. Otherwise the first
/// active triangle wins.
///
/// # Returns
/// Row-major gains, `sources.len()` rows by `num_loudspeakers` columns.
/// Each row is energy-normalised. Directions outside every triangle yield
/// an all-zero row.
///
/// # Errors
/// Returns an error when `groups` and `inverses` differ in length, a group
/// references a loudspeaker outside `num_loudspeakers`, or the spread is out
/// of range.
pub fn vbap_3d(
    sources: &[Direction],
    num_loudspeakers: usize,
    groups: &[[usize; 3]],
    inverses: &[Matrix3<f32>],
    spread_deg: f32,
) -> Result<Vec<f32>, VbapError> {
    check_groups(groups, inverses.len(), num_loudspeakers)?;
    check_spread(spread_deg)?;

    let mut gains = vec![0.0_f32; sources.len() * num_loudspeakers];
    let mut uncovered = 0usize;
    for (source, row) in sources.iter().zip(gains.chunks_exact_mut(num_loudspeakers.max(1))) {
        if !solve_direction_3d(*source, spread_deg, groups, inverses, row)? {
            uncovered += 1;
        }
    }
    if uncovered > 0 {
        warn!(
            "{} of {} source directions are not covered by any loudspeaker triangle.",
            uncovered,
            sources.len()
        );
    }
    Ok(gains)
}

/// Compute 2D VBAP gains for a list of source directions.
///
/// Only azimuths are used. The first active pair wins.
///
/// # Errors
/// Returns an error when `pairs` and `inverses` differ in length or a pair
/// references a loudspeaker outside `num_loudspeakers`.
pub fn vbap_2d(
    sources: &[Direction],
    num_loudspeakers: usize,
    pairs: &[[usize; 2]],
    inverses: &[Matrix2<f32>],
) -> Result<Vec<f32>, VbapError> {
    check_groups(pairs, inverses.len(), num_loudspeakers)?;

    let mut gains = vec![0.0_f32; sources.len() * num_loudspeakers];
    let mut uncovered = 0usize;
    for (source, row) in sources.iter().zip(gains.chunks_exact_mut(num_loudspeakers.max(1))) {
        if !solve_direction_2d(*source, pairs, inverses, row) {
            uncovered += 1;
        }
    }
    if uncovered > 0 {
        warn!(
            "{} of {} source directions are not covered by any loudspeaker pair.",
            uncovered,
            sources.len()
        );
    }
    Ok(gains)
}

/// Fill `row` with the energy-normalised gains of one direction.
///
/// Returns `false` when no triangle covers the direction; `row` is then left
/// all zero.
pub(crate) fn solve_direction_3d(
    direction: Direction,
    spread_deg: f32,
    groups: &[[usize; 3]],
    inverses: &[Matrix3<f32>],
    row: &mut [f32],
) -> Result<bool, VbapError> {
    row.fill(0.0);
    if spread_deg > SPREAD_THRESHOLD_DEG {
        for target in spread_source_directions(direction, spread_deg)? {
            accumulate_3d(target, groups, inverses, row, false);
        }
    } else {
        accumulate_3d(direction.to_unit_vector(), groups, inverses, row, true);
    }
    Ok(normalize_energy(row))
}

pub(crate) fn solve_direction_2d(
    direction: Direction,
    pairs: &[[usize; 2]],
    inverses: &[Matrix2<f32>],
    row: &mut [f32],
) -> bool {
    row.fill(0.0);
    let target = unit_azimuth_to_cart(direction.azimuth);
    for (pair, inverse) in pairs.iter().zip(inverses) {
        let g = *inverse * target;
        if g.x.min(g.y) > GAIN_TOLERANCE {
            let norm = g.magnitude();
            row[pair[0]] = g.x / norm;
            row[pair[1]] = g.y / norm;
            break;
        }
    }
    normalize_energy(row)
}

fn accumulate_3d(
    target: Vector3<f32>,
    groups: &[[usize; 3]],
    inverses: &[Matrix3<f32>],
    row: &mut [f32],
    first_only: bool,
) {
    for (group, inverse) in groups.iter().zip(inverses) {
        let g = *inverse * target;
        if g.x.min(g.y).min(g.z) > GAIN_TOLERANCE {
            let norm = g.magnitude();
            row[group[0]] += g.x / norm;
            row[group[1]] += g.y / norm;
            row[group[2]] += g.z / norm;
            if first_only {
                break;
            }
        }
    }
}

/// Scale `row` to unit energy and clamp negatives to zero.
///
/// Returns `false` for an all-zero row, which is left untouched.
pub(crate) fn normalize_energy(row: &mut [f32]) -> bool {
    let energy: f32 = row.iter().map(|g| g * g).sum();
    if energy <= 0.0 || !energy.is_finite() {
        row.fill(0.0);
        return false;
    }
    let scale = 1.0 / energy.sqrt();
    for gain in row.iter_mut() {
        *gain = (*gain * scale).max(0.0);
    }
    true
}

pub(crate) fn check_spread(spread_deg: f32) -> Result<(), VbapError> {
    if spread_deg.is_finite() && (0.0..180.0).contains(&spread_deg) {
        Ok(())
    } else {
        Err(VbapError::InvalidSpread(spread_deg))
    }
}

fn check_groups<const N: usize>(
    groups: &[[usize; N]],
    num_inverses: usize,
    num_loudspeakers: usize,
) -> Result<(), VbapError> {
    if groups.len() != num_inverses {
        return Err(VbapError::DimensionMismatch {
            expected: groups.len(),
            found: num_inverses,
        });
    }
    if let Some(&index) = groups.iter().flatten().find(|&&index| index >= num_loudspeakers) {
        return Err(VbapError::DimensionMismatch {
            expected: num_loudspeakers,
            found: index + 1,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::angle_between;
    use crate::inversion::{invert_ls_mtx_2d, invert_ls_mtx_3d};
    use crate::test_layouts::{cube, horizontal_ring, nonzero_columns, octahedron, sum_of_squares};
    use crate::triangulation::{find_ls_pairs, find_ls_triplets, TriangulationSettings};

    fn prepare(layout: &[Direction]) -> (Vec<[usize; 3]>, Vec<Matrix3<f32>>) {
        let tri = find_ls_triplets(layout, &TriangulationSettings::default()).expect("triangulate");
        let inverses = invert_ls_mtx_3d(&tri.vertices, &tri.groups).expect("invert");
        (tri.groups, inverses)
    }

    #[test]
    fn spread_ring_sits_on_the_requested_cone() {
        let source = Direction::new(20.0, 10.0);
        let dirs = spread_source_directions(source, 40.0).expect("spread");
        assert_eq!(dirs.len(), SPREAD_RINGS * SPREAD_RING_SOURCES + 1);
        let axis = source.to_unit_vector();
        for dir in &dirs[..SPREAD_RING_SOURCES] {
            assert!((dir.magnitude() - 1.0).abs() < 1e-5);
            assert!((angle_between(axis, *dir) - 20.0).abs() < 1e-2);
        }
        assert_eq!(*dirs.last().expect("source"), axis);
    }

    #[test]
    fn spread_ring_handles_poles() {
        let dirs = spread_source_directions(Direction::new(0.0, 90.0), 30.0).expect("spread");
        assert!(dirs.iter().all(|d| d.x.is_finite() && d.y.is_finite() && d.z.is_finite()));
        for dir in &dirs[..SPREAD_RING_SOURCES] {
            assert!((dir.z - 15.0_f32.to_radians().cos()).abs() < 1e-4);
        }
    }

    #[test]
    fn spread_out_of_range_is_rejected() {
        assert_eq!(
            spread_source_directions(Direction::new(0.0, 0.0), 180.0).unwrap_err(),
            VbapError::InvalidSpread(180.0)
        );
        assert!(spread_source_directions(Direction::new(0.0, 0.0), -1.0).is_err());
    }

    #[test]
    fn source_on_loudspeaker_gets_unit_gain() {
        let layout = octahedron();
        let (groups, inverses) = prepare(&layout);
        let gains = vbap_3d(&layout, layout.len(), &groups, &inverses, 0.0).expect("gains");
        for (k, row) in gains.chunks(layout.len()).enumerate() {
            for (j, &g) in row.iter().enumerate() {
                let expected = if j == k { 1.0 } else { 0.0 };
                assert!((g - expected).abs() < 1e-4, "row {} col {} = {}", k, j, g);
            }
        }
    }

    #[test]
    fn rows_are_energy_normalised_and_non_negative() {
        let layout = cube();
        let (groups, inverses) = prepare(&layout);
        let sources: Vec<Direction> = (0..36)
            .flat_map(|a| [-60.0_f32, -20.0, 0.0, 25.0, 70.0].map(|e| Direction::new(a as f32 * 10.0 - 180.0, e)))
            .collect();
        for spread in [0.0, 25.0] {
            let gains = vbap_3d(&sources, layout.len(), &groups, &inverses, spread).expect("gains");
            for row in gains.chunks(layout.len()) {
                assert!((sum_of_squares(row) - 1.0).abs() < 1e-5);
                assert!(row.iter().all(|&g| g >= 0.0));
            }
        }
    }

    #[test]
    fn spreading_activates_more_loudspeakers() {
        let layout = cube();
        let (groups, inverses) = prepare(&layout);
        let source = [Direction::new(10.0, 20.0)];
        let point = vbap_3d(&source, layout.len(), &groups, &inverses, 0.0).expect("gains");
        let spread = vbap_3d(&source, layout.len(), &groups, &inverses, 60.0).expect("gains");
        let before = nonzero_columns(&point, 1e-6);
        let after = nonzero_columns(&spread, 1e-6);
        assert!(after.len() >= before.len());
        assert!(before.iter().all(|col| after.contains(col)));
        assert!((sum_of_squares(&spread) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn uncovered_direction_gives_zero_row() {
        // Top cap only: nothing below the horizon is covered.
        let layout = vec![
            Direction::new(0.0, 10.0),
            Direction::new(120.0, 10.0),
            Direction::new(-120.0, 10.0),
            Direction::new(0.0, 90.0),
        ];
        let (groups, inverses) = prepare(&layout);
        let gains =
            vbap_3d(&[Direction::new(0.0, -80.0)], layout.len(), &groups, &inverses, 0.0).expect("gains");
        assert!(gains.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn mismatched_inverses_are_rejected() {
        let layout = octahedron();
        let (groups, inverses) = prepare(&layout);
        let err = vbap_3d(&layout, layout.len(), &groups, &inverses[1..], 0.0).unwrap_err();
        assert!(matches!(err, VbapError::DimensionMismatch { .. }));
        let err = vbap_3d(&layout, 3, &groups, &inverses, 0.0).unwrap_err();
        assert!(matches!(err, VbapError::DimensionMismatch { .. }));
    }

    #[test]
    fn vbap_2d_pans_between_adjacent_pair() {
        let layout = horizontal_ring(4);
        let pairs = find_ls_pairs(&layout).expect("pairs");
        let inverses = invert_ls_mtx_2d(&layout, &pairs).expect("invert");
        // Ring is at -180, -90, 0, 90; 45 degrees sits between 0 and 90.
        let gains = vbap_2d(&[Direction::horizontal(45.0)], 4, &pairs, &inverses).expect("gains");
        assert_eq!(nonzero_columns(&gains, 1e-6), vec![2, 3]);
        assert!((gains[2] - gains[3]).abs() < 1e-5);
        assert!((sum_of_squares(&gains) - 1.0).abs() < 1e-5);

        let gains = vbap_2d(&[Direction::horizontal(-90.0)], 4, &pairs, &inverses).expect("gains");
        assert!((gains[1] - 1.0).abs() < 1e-5);
    }
}

//! Loudspeaker triangulation (3D) and pairing (2D).

use cgmath::{InnerSpace, Vector3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{ACOS_CLAMP, APERTURE_LIMIT_DEG};
use crate::error::VbapError;
use crate::geometry::{deserialize_degrees, hull, validate_directions, wrap_azimuth, Direction};

/// Options for filtering hull faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangulationSettings {
    /// Drop triangles with an edge aperture at or above `aperture_limit_deg`.
    pub omit_large_triangles: bool,
    #[serde(deserialize_with = "deserialize_degrees")]
    pub aperture_limit_deg: f32,
}

impl Default for TriangulationSettings {
    fn default() -> Self {
        Self {
            omit_large_triangles: false,
            aperture_limit_deg: APERTURE_LIMIT_DEG,
        }
    }
}

/// Loudspeaker vertices and the triangles that form valid panning regions.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    pub vertices: Vec<Vector3<f32>>,
    /// Vertex index triples, ascending within each triple, sorted
    /// lexicographically.
    pub groups: Vec<[usize; 3]>,
}

impl Triangulation {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Vertices that share at least one triangle with `index`, ascending.
    pub fn neighbours(&self, index: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .groups
            .iter()
            .filter(|group| group.contains(&index))
            .flat_map(|group| group.iter().copied())
            .filter(|&vertex| vertex != index)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Triangulate a 3D loudspeaker layout.
///
/// The convex hull of the loudspeaker unit vectors is filtered twice. Faces
/// whose normal is 90 degrees or more away from their centroid are dropped.
/// With `omit_large_triangles` set, faces with any vertex pair separated by
/// the aperture limit or more are dropped as well.
///
/// # Returns
/// An empty `groups` list when the layout is degenerate (e.g. coplanar). No
/// panning is possible with such a layout.
///
/// # Errors
/// Returns an error for fewer than 3 loudspeakers, invalid directions or a
/// non-positive aperture limit.
pub fn find_ls_triplets(
    directions: &[Direction],
    settings: &TriangulationSettings,
) -> Result<Triangulation, VbapError> {
    if directions.len() < 3 {
        return Err(VbapError::TooFewLoudspeakers {
            required: 3,
            found: directions.len(),
        });
    }
    validate_directions(directions)?;
    if !(settings.aperture_limit_deg.is_finite() && settings.aperture_limit_deg > 0.0) {
        return Err(VbapError::InvalidArgument(format!(
            "aperture limit must be positive, got {}",
            settings.aperture_limit_deg
        )));
    }

    let vertices: Vec<Vector3<f32>> = directions.iter().map(|d| d.to_unit_vector()).collect();
    let points: Vec<Vector3<f64>> = directions.iter().map(|d| unit_vector_f64(*d)).collect();

    let faces = hull::convex_hull(&points);
    if faces.is_empty() {
        warn!(
            "Convex hull of {} loudspeakers has no faces; layout is degenerate.",
            directions.len()
        );
        return Ok(Triangulation {
            vertices,
            groups: Vec::new(),
        });
    }

    let hull_faces = faces.len();
    let mut groups: Vec<[usize; 3]> = faces
        .into_iter()
        .filter(|face| faces_outward(&vertices, face))
        .collect();
    debug!(
        "Kept {} of {} hull faces after the orientation filter.",
        groups.len(),
        hull_faces
    );

    if settings.omit_large_triangles {
        let before = groups.len();
        let cos_limit = settings.aperture_limit_deg.to_radians().cos();
        groups.retain(|group| within_aperture(&vertices, group, cos_limit));
        debug!(
            "Aperture filter ({} deg) removed {} triangles.",
            settings.aperture_limit_deg,
            before - groups.len()
        );
    }

    for group in &mut groups {
        group.sort_unstable();
    }
    groups.sort_unstable();

    Ok(Triangulation { vertices, groups })
}

/// Pair each loudspeaker of a 2D layout with its anti-clockwise neighbour.
///
/// Loudspeakers are sorted by azimuth and each one is paired with its
/// successor, the last wrapping to the first. Elevations are ignored.
///
/// # Errors
/// Returns an error for fewer than 2 loudspeakers or invalid directions.
pub fn find_ls_pairs(directions: &[Direction]) -> Result<Vec<[usize; 2]>, VbapError> {
    if directions.len() < 2 {
        return Err(VbapError::TooFewLoudspeakers {
            required: 2,
            found: directions.len(),
        });
    }
    validate_directions(directions)?;

    let mut order: Vec<usize> = (0..directions.len()).collect();
    order.sort_by(|&a, &b| {
        wrap_azimuth(directions[a].azimuth).total_cmp(&wrap_azimuth(directions[b].azimuth))
    });

    if order.len() == 2 {
        return Ok(vec![[order[0], order[1]]]);
    }

    Ok((0..order.len())
        .map(|i| [order[i], order[(i + 1) % order.len()]])
        .collect())
}

fn unit_vector_f64(direction: Direction) -> Vector3<f64> {
    let azimuth = (direction.azimuth as f64).to_radians();
    let elevation = (direction.elevation as f64).to_radians();
    Vector3::new(
        azimuth.cos() * elevation.cos(),
        azimuth.sin() * elevation.cos(),
        elevation.sin(),
    )
}

fn faces_outward(vertices: &[Vector3<f32>], face: &[usize; 3]) -> bool {
    let [v0, v1, v2] = face.map(|index| vertices[index]);
    let normal = (v1 - v0).cross(v2 - v1);
    let centroid = (v0 + v1 + v2) / 3.0;

    let denom = normal.magnitude() * centroid.magnitude();
    if denom <= 0.0 {
        return false;
    }
    let cos_theta = (normal.dot(centroid) / denom).clamp(-ACOS_CLAMP, ACOS_CLAMP);
    cos_theta.acos() < std::f32::consts::FRAC_PI_2
}

fn within_aperture(vertices: &[Vector3<f32>], group: &[usize; 3], cos_limit: f32) -> bool {
    let [a, b, c] = group.map(|index| vertices[index].normalize());
    // Larger angle means smaller cosine.
    [a.dot(b), b.dot(c), c.dot(a)]
        .iter()
        .all(|&cos_angle| cos_angle > cos_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_layouts::{cube, octahedron};

    #[test]
    fn cube_triangulates_into_twelve_triangles() {
        let tri = find_ls_triplets(&cube(), &TriangulationSettings::default()).expect("triangulate");
        assert_eq!(tri.len(), 12);
        assert_eq!(tri.vertices.len(), 8);
        for group in &tri.groups {
            assert!(group[0] < group[1] && group[1] < group[2]);
        }
        let mut sorted = tri.groups.clone();
        sorted.sort();
        assert_eq!(sorted, tri.groups);
    }

    #[test]
    fn octahedron_triangulates_into_eight_triangles() {
        let tri = find_ls_triplets(&octahedron(), &TriangulationSettings::default())
            .expect("triangulate");
        assert_eq!(tri.len(), 8);
        assert_eq!(tri.neighbours(4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn horizontal_ring_is_degenerate() {
        let ring: Vec<Direction> = (0..6).map(|i| Direction::horizontal(i as f32 * 60.0)).collect();
        let tri = find_ls_triplets(&ring, &TriangulationSettings::default()).expect("triangulate");
        assert!(tri.is_empty());
    }

    #[test]
    fn hemisphere_drops_faces_through_the_origin() {
        // Square at the horizon plus a top loudspeaker: the bottom cap
        // passes through the origin and must be rejected.
        let layout = vec![
            Direction::new(45.0, 0.0),
            Direction::new(135.0, 0.0),
            Direction::new(-135.0, 0.0),
            Direction::new(-45.0, 0.0),
            Direction::new(0.0, 90.0),
        ];
        let tri = find_ls_triplets(&layout, &TriangulationSettings::default()).expect("triangulate");
        assert_eq!(tri.len(), 4);
        assert!(tri.groups.iter().all(|group| group.contains(&4)));
    }

    #[test]
    fn aperture_filter_removes_wide_triangles() {
        let settings = TriangulationSettings {
            omit_large_triangles: true,
            aperture_limit_deg: 80.0,
        };
        let tri = find_ls_triplets(&octahedron(), &settings).expect("triangulate");
        assert!(tri.is_empty());

        let settings = TriangulationSettings {
            omit_large_triangles: true,
            aperture_limit_deg: 100.0,
        };
        let tri = find_ls_triplets(&octahedron(), &settings).expect("triangulate");
        assert_eq!(tri.len(), 8);
    }

    #[test]
    fn too_few_loudspeakers_is_an_error() {
        let err = find_ls_triplets(
            &[Direction::new(0.0, 0.0), Direction::new(90.0, 0.0)],
            &TriangulationSettings::default(),
        )
        .unwrap_err();
        assert_eq!(err, VbapError::TooFewLoudspeakers { required: 3, found: 2 });
    }

    #[test]
    fn pairs_follow_azimuth_order_and_wrap() {
        let layout = vec![
            Direction::horizontal(30.0),
            Direction::horizontal(-30.0),
            Direction::horizontal(0.0),
            Direction::horizontal(110.0),
            Direction::horizontal(-110.0),
        ];
        let pairs = find_ls_pairs(&layout).expect("pairs");
        assert_eq!(pairs, vec![[4, 1], [1, 2], [2, 0], [0, 3], [3, 4]]);
    }

    #[test]
    fn two_loudspeakers_form_a_single_pair() {
        let layout = vec![Direction::horizontal(30.0), Direction::horizontal(-30.0)];
        assert_eq!(find_ls_pairs(&layout).expect("pairs"), vec![[1, 0]]);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: TriangulationSettings =
            serde_json::from_str(r#"{"omit_large_triangles":true}"#).expect("deserialize");
        assert!(settings.omit_large_triangles);
        assert_eq!(settings.aperture_limit_deg, APERTURE_LIMIT_DEG);
    }
}

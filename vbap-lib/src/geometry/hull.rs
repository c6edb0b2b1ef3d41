//! Incremental convex hull of points in 3D.
//!
//! Loudspeaker directions all lie on the unit sphere, so every distinct
//! direction ends up a hull vertex and the hull faces form the spherical
//! Delaunay triangulation of the layout.

use std::collections::HashSet;

use cgmath::{InnerSpace, Vector3};

const HULL_EPSILON: f64 = 1e-9;
const MIN_FACE_AREA: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
struct Face {
    vertices: [usize; 3],
    normal: Vector3<f64>,
    offset: f64,
}

impl Face {
    /// Build a face whose normal points away from `interior`.
    fn oriented(points: &[Vector3<f64>], vertices: [usize; 3], interior: Vector3<f64>) -> Option<Self> {
        let [a, b, c] = vertices;
        let cross = (points[b] - points[a]).cross(points[c] - points[a]);
        if cross.magnitude() < MIN_FACE_AREA {
            return None;
        }
        let normal = cross.normalize();
        let offset = normal.dot(points[a]);
        let face = Self {
            vertices,
            normal,
            offset,
        };
        if face.distance(interior) > 0.0 {
            Some(Self {
                vertices: [a, c, b],
                normal: -normal,
                offset: -offset,
            })
        } else {
            Some(face)
        }
    }

    fn distance(&self, point: Vector3<f64>) -> f64 {
        self.normal.dot(point) - self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Compute the convex hull of `points`.
///
/// Returns outward-facing triangles (anti-clockwise seen from outside) as
/// index triples into `points`. Fewer than four points, or colinear or
/// coplanar input, yields an empty list.
pub fn convex_hull(points: &[Vector3<f64>]) -> Vec<[usize; 3]> {
    if points.len() < 4 {
        return Vec::new();
    }

    let seed = match initial_tetrahedron(points) {
        Some(seed) => seed,
        None => return Vec::new(),
    };
    let interior = (points[seed[0]] + points[seed[1]] + points[seed[2]] + points[seed[3]]) / 4.0;

    let [a, b, c, d] = seed;
    let mut faces: Vec<Face> = [[a, b, c], [a, b, d], [a, c, d], [b, c, d]]
        .into_iter()
        .filter_map(|tri| Face::oriented(points, tri, interior))
        .collect();

    for (index, &point) in points.iter().enumerate() {
        if seed.contains(&index) {
            continue;
        }

        let visible: Vec<bool> = faces
            .iter()
            .map(|face| face.distance(point) > HULL_EPSILON)
            .collect();
        if !visible.iter().any(|&v| v) {
            continue;
        }

        let visible_edges: Vec<(usize, usize)> = faces
            .iter()
            .zip(&visible)
            .filter(|(_, v)| **v)
            .flat_map(|(face, _)| face.edges())
            .collect();
        let edge_set: HashSet<(usize, usize)> = visible_edges.iter().copied().collect();
        let horizon: Vec<(usize, usize)> = visible_edges
            .into_iter()
            .filter(|&(from, to)| !edge_set.contains(&(to, from)))
            .collect();

        let mut kept = Vec::with_capacity(faces.len() + horizon.len());
        for (face, v) in faces.into_iter().zip(visible) {
            if !v {
                kept.push(face);
            }
        }
        for (from, to) in horizon {
            if let Some(face) = Face::oriented(points, [from, to, index], interior) {
                kept.push(face);
            }
        }
        faces = kept;
    }

    faces.into_iter().map(|face| face.vertices).collect()
}

fn initial_tetrahedron(points: &[Vector3<f64>]) -> Option<[usize; 4]> {
    let a = 0;
    let b = argmax(points, |p| (p - points[a]).magnitude2())?;
    if (points[b] - points[a]).magnitude() < HULL_EPSILON {
        return None;
    }

    let ab = points[b] - points[a];
    let c = argmax(points, |p| (p - points[a]).cross(ab).magnitude2())?;
    let plane = (points[c] - points[a]).cross(ab);
    if plane.magnitude() < HULL_EPSILON {
        return None;
    }

    let plane = plane.normalize();
    let d = argmax(points, |p| plane.dot(p - points[a]).abs())?;
    if plane.dot(points[d] - points[a]).abs() < HULL_EPSILON {
        return None;
    }

    Some([a, b, c, d])
}

fn argmax(points: &[Vector3<f64>], score: impl Fn(Vector3<f64>) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &point) in points.iter().enumerate() {
        let value = score(point);
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octahedron() -> Vec<Vector3<f64>> {
        vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, -1.0),
        ]
    }

    #[test]
    fn octahedron_has_eight_outward_faces() {
        let points = octahedron();
        let faces = convex_hull(&points);
        assert_eq!(faces.len(), 8);
        for face in faces {
            let [a, b, c] = face;
            let normal = (points[b] - points[a]).cross(points[c] - points[a]);
            let centroid = (points[a] + points[b] + points[c]) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn every_edge_is_shared_by_two_faces() {
        let points = octahedron();
        let faces = convex_hull(&points);
        let mut edges = HashSet::new();
        for face in &faces {
            let [a, b, c] = *face;
            for edge in [(a, b), (b, c), (c, a)] {
                assert!(edges.insert(edge), "directed edge repeated");
            }
        }
        for &(a, b) in &edges {
            assert!(edges.contains(&(b, a)));
        }
    }

    #[test]
    fn interior_points_are_ignored() {
        let mut points = octahedron();
        points.push(Vector3::new(0.1, 0.1, 0.1));
        let faces = convex_hull(&points);
        assert_eq!(faces.len(), 8);
        assert!(faces.iter().all(|face| !face.contains(&6)));
    }

    #[test]
    fn coplanar_points_give_no_faces() {
        let points: Vec<Vector3<f64>> = (0..6)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::PI / 3.0;
                Vector3::new(angle.cos(), angle.sin(), 0.0)
            })
            .collect();
        assert!(convex_hull(&points).is_empty());
    }

    #[test]
    fn too_few_points_give_no_faces() {
        let points = vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        assert!(convex_hull(&points).is_empty());
    }
}

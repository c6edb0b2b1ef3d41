//! Direction types and spherical geometry helpers.

use cgmath::{InnerSpace, Vector2, Vector3};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::ACOS_CLAMP;
use crate::error::VbapError;

mod angle;
pub mod hull;

pub use angle::{deserialize_degrees, Degrees};

/// Azimuth/elevation pair in degrees.
///
/// Azimuth is measured anti-clockwise from the front (positive x axis),
/// elevation upwards from the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Direction {
    pub azimuth: f32,
    pub elevation: f32,
}

impl Direction {
    pub fn new(azimuth: f32, elevation: f32) -> Self {
        Self { azimuth, elevation }
    }

    /// Direction on the horizontal plane.
    pub fn horizontal(azimuth: f32) -> Self {
        Self::new(azimuth, 0.0)
    }

    pub fn to_unit_vector(self) -> Vector3<f32> {
        unit_sph_to_cart(self)
    }

    pub fn from_unit_vector(vector: Vector3<f32>) -> Self {
        unit_cart_to_sph(vector)
    }

    pub fn is_valid(&self) -> bool {
        self.azimuth.is_finite()
            && self.elevation.is_finite()
            && (-90.0..=90.0).contains(&self.elevation)
    }
}

impl From<(f32, f32)> for Direction {
    fn from((azimuth, elevation): (f32, f32)) -> Self {
        Self::new(azimuth, elevation)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DirectionRepr {
    Pair(Degrees, Degrees),
    Named {
        azimuth: Degrees,
        #[serde(default = "zero_degrees")]
        elevation: Degrees,
    },
}

fn zero_degrees() -> Degrees {
    Degrees(0.0)
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let direction = match DirectionRepr::deserialize(deserializer)? {
            DirectionRepr::Pair(azimuth, elevation) => Direction::new(azimuth.0, elevation.0),
            DirectionRepr::Named { azimuth, elevation } => Direction::new(azimuth.0, elevation.0),
        };
        Ok(direction)
    }
}

/// Convert a direction in degrees to a unit Cartesian vector.
pub fn unit_sph_to_cart(direction: Direction) -> Vector3<f32> {
    let azimuth = direction.azimuth.to_radians();
    let elevation = direction.elevation.to_radians();
    Vector3::new(
        azimuth.cos() * elevation.cos(),
        azimuth.sin() * elevation.cos(),
        elevation.sin(),
    )
}

/// Convert a Cartesian vector (any length) to a direction in degrees.
pub fn unit_cart_to_sph(vector: Vector3<f32>) -> Direction {
    let horizontal = (vector.x * vector.x + vector.y * vector.y).sqrt();
    Direction::new(
        vector.y.atan2(vector.x).to_degrees(),
        vector.z.atan2(horizontal).to_degrees(),
    )
}

/// Unit vector on the horizontal plane for an azimuth in degrees.
pub fn unit_azimuth_to_cart(azimuth: f32) -> Vector2<f32> {
    let azimuth = azimuth.to_radians();
    Vector2::new(azimuth.cos(), azimuth.sin())
}

/// Wrap an azimuth in degrees to (-180, 180].
pub fn wrap_azimuth(azimuth: f32) -> f32 {
    let mut wrapped = azimuth % 360.0;
    if wrapped <= -180.0 {
        wrapped += 360.0;
    } else if wrapped > 180.0 {
        wrapped -= 360.0;
    }
    wrapped
}

/// Angle between two vectors in degrees.
pub fn angle_between(a: Vector3<f32>, b: Vector3<f32>) -> f32 {
    let denom = a.magnitude() * b.magnitude();
    if denom <= 0.0 {
        return 90.0;
    }
    (a.dot(b) / denom)
        .clamp(-ACOS_CLAMP, ACOS_CLAMP)
        .acos()
        .to_degrees()
}

/// Reject non-finite values and elevations outside [-90, 90].
pub fn validate_directions(directions: &[Direction]) -> Result<(), VbapError> {
    for (index, direction) in directions.iter().enumerate() {
        if !direction.is_valid() {
            return Err(VbapError::InvalidDirection {
                index,
                azimuth: direction.azimuth,
                elevation: direction.elevation,
            });
        }
    }
    Ok(())
}

//! Shared constants for triangulation, gain solving and table post-processing.

/// A pole receives a dummy loudspeaker when no real loudspeaker lies within
/// this many degrees of it.
pub const ADD_DUMMY_LIMIT_DEG: f32 = 60.0;

/// Default aperture limit (degrees) for the large-triangle filter.
///
/// At 180 degrees the filter only rejects triangles with antipodal vertices.
pub const APERTURE_LIMIT_DEG: f32 = 180.0;

/// A loudspeaker group is active for a direction when every one of its gains
/// is at least this value.
pub const GAIN_TOLERANCE: f32 = -0.001;

/// Gains at or below this value are dropped by table compression.
pub const COMPRESS_EPSILON: f32 = 1e-7;

/// Spreading is applied only above this spread (degrees).
pub const SPREAD_THRESHOLD_DEG: f32 = 0.1;

/// Auxiliary directions per spreading ring.
pub const SPREAD_RING_SOURCES: usize = 8;

/// Number of spreading rings.
pub const SPREAD_RINGS: usize = 1;

/// Guard added to normalisation denominators.
pub const NORM_EPSILON: f32 = 2.23e-9;

/// Group matrices with an absolute determinant below this are singular.
pub const SINGULAR_DETERMINANT: f32 = 1e-6;

/// Clamp applied to cosines before `acos`: the largest `f32` below 1.
pub const ACOS_CLAMP: f32 = 1.0 - f32::EPSILON / 2.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acos_clamp_stays_inside_the_domain() {
        assert!(ACOS_CLAMP < 1.0);
        assert!(ACOS_CLAMP > 0.999_999);
        assert!(ACOS_CLAMP.acos() > 0.0);
    }
}
